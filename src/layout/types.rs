use serde::Serialize;

use super::placement::FlowerPlacement;
use super::text::TextFit;
use crate::flowers::{FlowerKind, FlowerShape};

/// Radial glow: `color` fading to transparent over `radius`.
#[derive(Debug, Clone, Serialize)]
pub struct GlowLayout {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoundedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

impl RoundedRect {
    /// Corner radius as painted: never more than half of either side.
    pub fn effective_radius(&self) -> f64 {
        self.radius
            .min(self.width / 2.0)
            .min(self.height / 2.0)
            .max(0.0)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardLayout {
    pub rect: RoundedRect,
    pub shadow: RoundedRect,
    pub shadow_alpha: f64,
}

/// Centered text block, top-aligned at `top_y`.
#[derive(Debug, Clone, Serialize)]
pub struct TextBlockLayout {
    pub fit: TextFit,
    pub center_x: f32,
    pub top_y: f32,
    /// Pixel distance between consecutive line tops.
    pub line_height: f32,
    pub font_family: String,
    pub font_weight: u16,
    pub color: String,
    pub max_width: f32,
}

impl TextBlockLayout {
    pub fn bottom_y(&self) -> f32 {
        self.top_y + self.fit.lines.len() as f32 * self.line_height
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StemLayout {
    pub start: (f64, f64),
    pub control: (f64, f64),
    pub end: (f64, f64),
    pub thickness: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeafLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians.
    pub rotation: f64,
    pub fill: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EllipseLayout {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    /// Radians.
    pub rotation: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrapLayout {
    pub rect: RoundedRect,
    pub shadow: RoundedRect,
    pub highlights: [EllipseLayout; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct VignetteLayout {
    pub inner_center: (f64, f64),
    pub inner_radius: f64,
    pub outer_center: (f64, f64),
    pub outer_radius: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatermarkLayout {
    pub text: String,
    pub x: f64,
    /// Alphabetic baseline.
    pub y: f64,
    pub font_px: f32,
    pub font_family: String,
    pub font_weight: u16,
}

/// A fully resolved bouquet: every random draw has been taken, so painting
/// it is a pure function of this value.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub seed: i32,
    pub kinds: Vec<FlowerKind>,
    pub glows: Vec<GlowLayout>,
    pub card: CardLayout,
    pub title: TextBlockLayout,
    pub title_shadow_blur: f32,
    pub tagline: TextBlockLayout,
    pub placements: Vec<FlowerPlacement>,
    pub stems: Vec<StemLayout>,
    pub leaves: Vec<LeafLayout>,
    pub wrap: WrapLayout,
    /// Paint order: back ring first.
    pub flowers: Vec<FlowerShape>,
    pub vignette: VignetteLayout,
    pub watermark: Option<WatermarkLayout>,
}
