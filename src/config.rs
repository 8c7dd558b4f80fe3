use crate::layout::text::{TAGLINE_MAX_FONT_PX, TAGLINE_MIN_FONT_PX, TITLE_MAX_FONT_PX, TITLE_MIN_FONT_PX};
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_WATERMARK_TEXT: &str = "tadinada.com/valentine";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// `(max, min)` font sizes tried for the title, in pixels.
    pub title_font_range: (u32, u32),
    pub title_weight: u16,
    pub title_top: f32,
    pub title_line_height: f32,
    pub tagline_font_range: (u32, u32),
    pub tagline_weight: u16,
    pub tagline_gap: f32,
    pub tagline_line_height: f32,
    /// Tagline width as a fraction of the title width.
    pub tagline_width_ratio: f32,
    /// Extra horizontal inset of the text block inside the card.
    pub text_inset: f32,
    pub title_shadow_blur: f32,
    /// Measure with the built-in width table instead of installed fonts.
    pub fast_text_metrics: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            title_font_range: (TITLE_MAX_FONT_PX, TITLE_MIN_FONT_PX),
            title_weight: 700,
            title_top: 175.0,
            title_line_height: 1.08,
            tagline_font_range: (TAGLINE_MAX_FONT_PX, TAGLINE_MIN_FONT_PX),
            tagline_weight: 500,
            tagline_gap: 18.0,
            tagline_line_height: 1.25,
            tagline_width_ratio: 0.92,
            text_inset: 120.0,
            title_shadow_blur: 18.0,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster scale applied on PNG export; the scene itself is fixed-size.
    pub scale: f32,
    pub watermark_text: String,
    pub watermark_font_px: f32,
    pub watermark_weight: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
            watermark_font_px: 22.0,
            watermark_weight: 500,
        }
    }
}

impl RenderConfig {
    pub const MIN_SCALE: f32 = 0.1;
    pub const MAX_SCALE: f32 = 4.0;

    /// Scale clamped into the supported range; non-finite values fall back to 1.
    pub fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() {
            self.scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub text: TextConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    text: Option<TextConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    title_font_family: Option<String>,
    tagline_font_family: Option<String>,
    font_family: Option<String>,
    background_stops: Option<Vec<(f32, String)>>,
    glow_colors: Option<Vec<String>>,
    card_fill_start: Option<String>,
    card_fill_end: Option<String>,
    title_color: Option<String>,
    title_shadow_color: Option<String>,
    tagline_color: Option<String>,
    stem_color: Option<String>,
    stem_outline_color: Option<String>,
    leaf_colors: Option<[String; 2]>,
    wrap_stops: Option<Vec<(f32, String)>>,
    vignette_color: Option<String>,
    vignette_opacity: Option<NumberOrString>,
    watermark_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextConfigFile {
    title_max_font_px: Option<u32>,
    title_min_font_px: Option<u32>,
    tagline_max_font_px: Option<u32>,
    tagline_min_font_px: Option<u32>,
    title_line_height: Option<f32>,
    tagline_line_height: Option<f32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
    watermark_text: Option<String>,
    watermark_font_px: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parses a camelCase JSON config (JSON5 accepted) on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            anyhow::anyhow!("not valid JSON ({json_err}) or JSON5 ({json5_err})")
        })?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::from_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme preset, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }

    if let Some(text) = parsed.text {
        let cfg = &mut config.text;
        if let Some(v) = text.title_max_font_px {
            cfg.title_font_range.0 = v;
        }
        if let Some(v) = text.title_min_font_px {
            cfg.title_font_range.1 = v;
        }
        if let Some(v) = text.tagline_max_font_px {
            cfg.tagline_font_range.0 = v;
        }
        if let Some(v) = text.tagline_min_font_px {
            cfg.tagline_font_range.1 = v;
        }
        if let Some(v) = text.title_line_height {
            cfg.title_line_height = v;
        }
        if let Some(v) = text.tagline_line_height {
            cfg.tagline_line_height = v;
        }
        if let Some(v) = text.fast_text_metrics {
            cfg.fast_text_metrics = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.scale {
            config.render.scale = v;
        }
        if let Some(v) = render.watermark_text {
            config.render.watermark_text = v;
        }
        if let Some(v) = render.watermark_font_px {
            config.render.watermark_font_px = v;
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.title_font_family = v.clone();
        theme.tagline_font_family = v;
    }
    if let Some(v) = vars.title_font_family {
        theme.title_font_family = v;
    }
    if let Some(v) = vars.tagline_font_family {
        theme.tagline_font_family = v;
    }
    if let Some(v) = vars.background_stops {
        theme.background_stops = v;
    }
    if let Some(v) = vars.glow_colors {
        theme.glow_colors = v;
    }
    if let Some(v) = vars.card_fill_start {
        theme.card_fill_start = v;
    }
    if let Some(v) = vars.card_fill_end {
        theme.card_fill_end = v;
    }
    if let Some(v) = vars.title_color {
        theme.title_color = v;
    }
    if let Some(v) = vars.title_shadow_color {
        theme.title_shadow_color = v;
    }
    if let Some(v) = vars.tagline_color {
        theme.tagline_color = v;
    }
    if let Some(v) = vars.stem_color {
        theme.stem_color = v;
    }
    if let Some(v) = vars.stem_outline_color {
        theme.stem_outline_color = v;
    }
    if let Some(v) = vars.leaf_colors {
        theme.leaf_colors = v;
    }
    if let Some(v) = vars.wrap_stops {
        theme.wrap_stops = v;
    }
    if let Some(v) = vars.vignette_color {
        theme.vignette_color = v;
    }
    if let Some(v) = vars.vignette_opacity.as_ref().and_then(NumberOrString::as_f32) {
        theme.vignette_opacity = v.clamp(0.0, 1.0);
    }
    if let Some(v) = vars.watermark_color {
        theme.watermark_color = v;
    }
}
