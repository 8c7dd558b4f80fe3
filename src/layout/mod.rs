mod placement;
pub mod text;
pub(crate) mod types;
pub use placement::{FLOWERS_PER_RING, FlowerPlacement, layout_flowers};
pub use text::{FontMeasure, TextFit, TextMeasure, fit_tagline, fit_text, fit_title};
pub use types::*;

use crate::config::{Config, TextConfig};
use crate::flowers::{draw_flower, stem_control_point};
use crate::input::{BouquetInput, ResolvedBouquet};
use crate::rng::{Rng, clamp};
use crate::theme::Theme;

/// Canvas size of every bouquet, in pixels.
pub const CANVAS_WIDTH: f64 = 1200.0;
pub const CANVAS_HEIGHT: f64 = 1500.0;

const GLOW_COUNT: usize = 22;
const GLOW_ALPHA: f64 = 0.12;
const CARD_PAD: f64 = 70.0;
const CARD_TOP: f64 = 90.0;
const CARD_RADIUS: f64 = 42.0;
const BUNDLE_Y: f64 = 1290.0;
const WRAP_WIDTH: f64 = 480.0;
const WRAP_HEIGHT: f64 = 120.0;
const WRAP_TOP: f64 = 1220.0;
const WRAP_RADIUS: f64 = 48.0;
const WATERMARK_BOTTOM_OFFSET: f64 = 85.0;
const STEM_JITTER: f64 = 14.0;
const LEAF_JITTER: f64 = 14.0;

pub fn compute_scene(input: &BouquetInput, config: &Config) -> Scene {
    let bouquet = ResolvedBouquet::from_input(input);
    compute_scene_resolved(&bouquet, config)
}

/// Builds the scene for an already-resolved bouquet. Random draws happen in a
/// fixed order: background glows, flower layout, stems and leaves, then
/// flower bodies back to front.
pub fn compute_scene_resolved(bouquet: &ResolvedBouquet, config: &Config) -> Scene {
    let theme = &config.theme;
    let width = CANVAS_WIDTH;
    let height = CANVAS_HEIGHT;
    let mut rng = Rng::new(bouquet.seed);

    let glows = background_glows(&mut rng, theme, width, height);
    let card = card_layout(width, height);
    let (title, tagline) = text_layout(bouquet, theme, &config.text, width);

    let placements = layout_flowers(&bouquet.kinds, &mut rng, width);
    let bundle = (width / 2.0, BUNDLE_Y);
    let mut stems = Vec::with_capacity(placements.len());
    let mut leaves = Vec::new();
    for flower in &placements {
        let thickness = clamp(flower.size * 0.12, 6.0, 14.0);
        let end = (flower.x + rng.jitter(STEM_JITTER), flower.y + flower.size * 0.48);
        stems.push(StemLayout {
            start: bundle,
            control: stem_control_point(bundle.0, bundle.1, end.0, end.1),
            end,
            thickness,
        });

        let leaf_count = if rng.next_f64() < 0.45 { 2 } else { 1 };
        for _ in 0..leaf_count {
            leaves.push(leaf_along_stem(&mut rng, theme, bundle, end));
        }
    }

    let wrap = wrap_layout(width);

    let mut back_to_front: Vec<&FlowerPlacement> = placements.iter().collect();
    back_to_front.sort_by(|a, b| b.layer.cmp(&a.layer));
    let flowers = back_to_front
        .into_iter()
        .map(|placement| draw_flower(placement, &mut rng))
        .collect();

    let vignette = VignetteLayout {
        inner_center: (width / 2.0, height * 0.45),
        inner_radius: width * 0.2,
        outer_center: (width / 2.0, height * 0.55),
        outer_radius: width * 0.85,
    };

    let watermark = bouquet.show_watermark.then(|| WatermarkLayout {
        text: config.render.watermark_text.clone(),
        x: width / 2.0,
        y: height - WATERMARK_BOTTOM_OFFSET,
        font_px: config.render.watermark_font_px,
        font_family: theme.tagline_font_family.clone(),
        font_weight: config.render.watermark_weight,
    });

    tracing::debug!(
        seed = bouquet.seed,
        flowers = placements.len(),
        leaves = leaves.len(),
        title_px = title.fit.font_px,
        title_lines = title.fit.lines.len(),
        "scene computed"
    );

    Scene {
        width,
        height,
        seed: bouquet.seed,
        kinds: bouquet.kinds.clone(),
        glows,
        card,
        title,
        title_shadow_blur: config.text.title_shadow_blur,
        tagline,
        placements,
        stems,
        leaves,
        wrap,
        flowers,
        vignette,
        watermark,
    }
}

fn background_glows(rng: &mut Rng, theme: &Theme, width: f64, height: f64) -> Vec<GlowLayout> {
    let mut glows = Vec::with_capacity(GLOW_COUNT);
    for _ in 0..GLOW_COUNT {
        let x = rng.next_f64() * width;
        let y = rng.next_f64() * height * 0.65;
        let radius = 80.0 + rng.next_f64() * 180.0;
        if let Some(color) = rng.pick(&theme.glow_colors) {
            glows.push(GlowLayout {
                x,
                y,
                radius,
                color: color.clone(),
                alpha: GLOW_ALPHA,
            });
        }
    }
    glows
}

fn card_layout(width: f64, height: f64) -> CardLayout {
    let rect = RoundedRect {
        x: CARD_PAD,
        y: CARD_TOP,
        width: width - CARD_PAD * 2.0,
        height: height - 160.0,
        radius: CARD_RADIUS,
    };
    CardLayout {
        rect,
        shadow: rect.offset(10.0, 16.0),
        shadow_alpha: 0.22,
    }
}

fn text_layout(
    bouquet: &ResolvedBouquet,
    theme: &Theme,
    text: &TextConfig,
    width: f64,
) -> (TextBlockLayout, TextBlockLayout) {
    let center_x = (width / 2.0) as f32;
    let max_width = width as f32 - 2.0 * (CARD_PAD as f32 + text.text_inset);

    let title_measure = FontMeasure {
        family: &theme.title_font_family,
        weight: text.title_weight,
        fast_metrics: text.fast_text_metrics,
    };
    let title_fit = fit_title(&title_measure, &bouquet.display_name, max_width, text.title_font_range);
    let title = TextBlockLayout {
        line_height: (title_fit.font_px as f32 * text.title_line_height).round(),
        fit: title_fit,
        center_x,
        top_y: text.title_top,
        font_family: theme.title_font_family.clone(),
        font_weight: text.title_weight,
        color: theme.title_color.clone(),
        max_width,
    };

    let tagline_width = max_width * text.tagline_width_ratio;
    let tagline_measure = FontMeasure {
        family: &theme.tagline_font_family,
        weight: text.tagline_weight,
        fast_metrics: text.fast_text_metrics,
    };
    let tagline_fit = fit_tagline(
        &tagline_measure,
        &bouquet.display_tagline,
        tagline_width,
        text.tagline_font_range,
    );
    let tagline = TextBlockLayout {
        line_height: (tagline_fit.font_px as f32 * text.tagline_line_height).round(),
        fit: tagline_fit,
        center_x,
        top_y: title.bottom_y() + text.tagline_gap,
        font_family: theme.tagline_font_family.clone(),
        font_weight: text.tagline_weight,
        color: theme.tagline_color.clone(),
        max_width: tagline_width,
    };

    (title, tagline)
}

fn leaf_along_stem(rng: &mut Rng, theme: &Theme, bundle: (f64, f64), end: (f64, f64)) -> LeafLayout {
    let along_x = 0.45 + rng.next_f64() * 0.35;
    let x = bundle.0 + (end.0 - bundle.0) * along_x + rng.jitter(LEAF_JITTER);
    let along_y = 0.45 + rng.next_f64() * 0.35;
    let y = bundle.1 + (end.1 - bundle.1) * along_y + rng.jitter(LEAF_JITTER);
    let width = 18.0 + rng.next_f64() * 14.0;
    let height = 40.0 + rng.next_f64() * 22.0;
    let rotation = rng.jitter(1.05);
    let fill = if rng.next_f64() < 0.5 {
        theme.leaf_colors[0].clone()
    } else {
        theme.leaf_colors[1].clone()
    };
    LeafLayout {
        x,
        y,
        width,
        height,
        rotation,
        fill,
    }
}

fn wrap_layout(width: f64) -> WrapLayout {
    let center_x = width / 2.0;
    let rect = RoundedRect {
        x: center_x - WRAP_WIDTH / 2.0,
        y: WRAP_TOP,
        width: WRAP_WIDTH,
        height: WRAP_HEIGHT,
        radius: WRAP_RADIUS,
    };
    let highlight = |dx: f64, rotation: f64| EllipseLayout {
        cx: center_x + dx,
        cy: WRAP_TOP + 55.0,
        rx: 100.0,
        ry: 56.0,
        rotation,
    };
    WrapLayout {
        rect,
        shadow: rect.offset(0.0, 10.0),
        highlights: [highlight(-140.0, -0.2), highlight(140.0, 0.2)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowers::FlowerKind;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.text.fast_text_metrics = true;
        config
    }

    #[test]
    fn same_input_same_scene() {
        let input = BouquetInput::new("Sam").with_variation(4);
        let a = compute_scene(&input, &fast_config());
        let b = compute_scene(&input, &fast_config());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn variation_changes_arrangement() {
        let a = compute_scene(&BouquetInput::new("Sam"), &fast_config());
        let b = compute_scene(&BouquetInput::new("Sam").with_variation(1), &fast_config());
        assert_eq!(a.kinds, b.kinds);
        assert_ne!(a.placements, b.placements);
    }

    #[test]
    fn tagline_does_not_disturb_flowers() {
        let a = compute_scene(&BouquetInput::new("Sam"), &fast_config());
        let b = compute_scene(
            &BouquetInput::new("Sam").with_tagline("a much longer tagline, with more words"),
            &fast_config(),
        );
        assert_eq!(a.placements, b.placements);
    }

    #[test]
    fn flowers_paint_back_ring_first() {
        let scene = compute_scene(&BouquetInput::new("Bartholomew Featherstonehaugh"), &fast_config());
        assert_eq!(scene.flowers.len(), scene.placements.len());
        let max_layer = scene.placements.iter().map(|p| p.layer).max().unwrap();
        assert!(max_layer >= 2);
        // The first painted flower comes from the deepest ring.
        let first = &scene.flowers[0];
        let from_back = scene
            .placements
            .iter()
            .filter(|p| p.layer == max_layer)
            .any(|p| p.x == first.x && p.y == first.y);
        assert!(from_back);
        let last = scene.flowers.last().unwrap();
        let top = &scene.placements[FLOWERS_PER_RING - 1];
        assert_eq!((last.x, last.y), (top.x, top.y));
    }

    #[test]
    fn one_stem_per_flower_and_one_or_two_leaves() {
        let scene = compute_scene(&BouquetInput::new("Penelope"), &fast_config());
        assert_eq!(scene.stems.len(), 8);
        assert!(scene.leaves.len() >= 8 && scene.leaves.len() <= 16);
        for stem in &scene.stems {
            assert_eq!(stem.start, (600.0, BUNDLE_Y));
            assert!((6.0..=14.0).contains(&stem.thickness));
        }
    }

    #[test]
    fn watermark_is_optional() {
        let with = compute_scene(&BouquetInput::new("Sam"), &fast_config());
        let without = compute_scene(&BouquetInput::new("Sam").with_watermark(false), &fast_config());
        assert!(with.watermark.is_some());
        assert!(without.watermark.is_none());
        assert_eq!(with.placements, without.placements);
        assert_eq!(with.watermark.unwrap().y, CANVAS_HEIGHT - 85.0);
    }

    #[test]
    fn text_block_stacks_under_title() {
        let scene = compute_scene(&BouquetInput::new("Sam"), &fast_config());
        assert_eq!(scene.title.top_y, 175.0);
        assert_eq!(scene.title.fit.lines, vec!["Sam"]);
        assert_eq!(scene.title.line_height, (86.0f32 * 1.08).round());
        assert_eq!(scene.tagline.top_y, scene.title.bottom_y() + 18.0);
        assert_eq!(scene.title.max_width, 1200.0 - 2.0 * (70.0 + 120.0));
    }

    #[test]
    fn glow_count_and_bounds() {
        let scene = compute_scene(&BouquetInput::new("Sam"), &fast_config());
        assert_eq!(scene.glows.len(), GLOW_COUNT);
        for glow in &scene.glows {
            assert!(glow.y <= CANVAS_HEIGHT * 0.65);
            assert!((80.0..=260.0).contains(&glow.radius));
        }
    }

    #[test]
    fn empty_glow_palette_keeps_stream_alignment() {
        let mut config = fast_config();
        let baseline = compute_scene(&BouquetInput::new("Sam"), &config);
        config.theme.glow_colors.clear();
        let scene = compute_scene(&BouquetInput::new("Sam"), &config);
        assert!(scene.glows.is_empty());
        assert_eq!(scene.placements, baseline.placements);
    }

    #[test]
    fn default_name_scene_uses_letter_kinds() {
        let scene = compute_scene(&BouquetInput::default(), &fast_config());
        assert_eq!(scene.kinds.first(), Some(&FlowerKind::Sunflower));
        assert_eq!(scene.kinds.len(), 13);
    }

    #[test]
    fn rounded_rect_radius_is_clamped() {
        let rect = RoundedRect {
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 60.0,
            radius: 42.0,
        };
        assert_eq!(rect.effective_radius(), 15.0);
    }
}
