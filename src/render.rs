use crate::flowers::FlowerShape;
use crate::layout::{
    EllipseLayout, LeafLayout, RoundedRect, Scene, StemLayout, TextBlockLayout, WatermarkLayout,
};
use crate::theme::{Stop, Theme};
use anyhow::Result;
use std::path::Path;

const PETAL_ALPHA: f64 = 0.95;
const FLOWER_GLOW_ALPHA: f64 = 0.16;
const SEED_DOT_ALPHA: f64 = 0.25;
const LEAF_ALPHA: f64 = 0.9;
const LEAF_VEIN_ALPHA: f64 = 0.18;
const WRAP_ALPHA: f64 = 0.95;
const WRAP_SHADOW_ALPHA: f64 = 0.25;

/// Paints a scene as a standalone SVG document. Output depends only on the
/// scene and theme, so equal inputs give byte-identical documents.
pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = scene.width;
    let height = scene.height;
    let glow_colors = glow_palette(scene);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    svg.push_str("<defs>");
    svg.push_str(&linear_gradient("bg", (0.0, 0.0), (width, height), &theme.background_stops));
    for (idx, color) in glow_colors.iter().enumerate() {
        svg.push_str(&format!(
            "<radialGradient id=\"glow-{idx}\"><stop offset=\"0\" stop-color=\"{color}\"/><stop offset=\"1\" stop-color=\"{color}\" stop-opacity=\"0\"/></radialGradient>",
            color = escape_xml(color)
        ));
    }
    let card = &scene.card.rect;
    svg.push_str(&linear_gradient(
        "card",
        (card.x, card.y),
        (card.x + card.width, card.y + card.height),
        &[
            (0.0, theme.card_fill_start.clone()),
            (1.0, theme.card_fill_end.clone()),
        ],
    ));
    let wrap = &scene.wrap.rect;
    svg.push_str(&linear_gradient(
        "wrap",
        (wrap.x, wrap.y),
        (wrap.x + wrap.width, wrap.y + wrap.height),
        &theme.wrap_stops,
    ));
    let vignette = &scene.vignette;
    svg.push_str(&format!(
        "<radialGradient id=\"vignette\" gradientUnits=\"userSpaceOnUse\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fx=\"{:.2}\" fy=\"{:.2}\" fr=\"{:.2}\"><stop offset=\"0\" stop-color=\"{color}\" stop-opacity=\"0\"/><stop offset=\"1\" stop-color=\"{color}\" stop-opacity=\"{:.2}\"/></radialGradient>",
        vignette.outer_center.0,
        vignette.outer_center.1,
        vignette.outer_radius,
        vignette.inner_center.0,
        vignette.inner_center.1,
        vignette.inner_radius,
        theme.vignette_opacity,
        color = escape_xml(&theme.vignette_color),
    ));
    if scene.title_shadow_blur > 0.0 {
        svg.push_str(&format!(
            "<filter id=\"title-glow\" x=\"-25%\" y=\"-50%\" width=\"150%\" height=\"200%\"><feDropShadow dx=\"0\" dy=\"0\" stdDeviation=\"{:.2}\" flood-color=\"{}\"/></filter>",
            scene.title_shadow_blur / 2.0,
            escape_xml(&theme.title_shadow_color)
        ));
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<rect width=\"{width}\" height=\"{height}\" fill=\"url(#bg)\"/>"
    ));
    for glow in &scene.glows {
        svg.push_str(&glow_circle(glow.x, glow.y, glow.radius, &glow.color, glow.alpha, &glow_colors));
    }

    svg.push_str(&rounded_rect_svg(
        &scene.card.shadow,
        &format!(
            "fill=\"{}\" opacity=\"{:.2}\"",
            escape_xml(&theme.card_shadow_color),
            scene.card.shadow_alpha
        ),
    ));
    svg.push_str(&rounded_rect_svg(card, "fill=\"url(#card)\""));

    let filter = (scene.title_shadow_blur > 0.0).then_some("url(#title-glow)");
    svg.push_str(&text_block_svg(&scene.title, filter));
    svg.push_str(&text_block_svg(&scene.tagline, None));

    for stem in &scene.stems {
        svg.push_str(&stem_svg(stem, stem.thickness + 2.0, &theme.stem_outline_color));
        svg.push_str(&stem_svg(stem, stem.thickness, &theme.stem_color));
    }
    for leaf in &scene.leaves {
        svg.push_str(&leaf_svg(leaf, &theme.leaf_vein_color));
    }

    svg.push_str(&wrap_svg(scene, theme));

    for flower in &scene.flowers {
        svg.push_str(&flower_svg(flower, &glow_colors));
    }

    svg.push_str(&format!(
        "<rect width=\"{width}\" height=\"{height}\" fill=\"url(#vignette)\"/>"
    ));

    if let Some(watermark) = &scene.watermark {
        svg.push_str(&watermark_svg(watermark, &theme.watermark_color));
    }

    svg.push_str("</svg>");
    svg
}

/// Distinct glow colors in first-use order; each gets one gradient.
fn glow_palette(scene: &Scene) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    let used = scene
        .glows
        .iter()
        .map(|glow| glow.color.as_str())
        .chain(scene.flowers.iter().map(|flower| flower.petal_color));
    for color in used {
        if !colors.iter().any(|known| known == color) {
            colors.push(color.to_string());
        }
    }
    colors
}

fn linear_gradient(id: &str, from: (f64, f64), to: (f64, f64), stops: &[Stop]) -> String {
    let mut out = format!(
        "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\">",
        from.0, from.1, to.0, to.1
    );
    for (offset, color) in stops {
        out.push_str(&format!(
            "<stop offset=\"{:.3}\" stop-color=\"{}\"/>",
            offset.clamp(0.0, 1.0),
            escape_xml(color)
        ));
    }
    out.push_str("</linearGradient>");
    out
}

fn glow_circle(x: f64, y: f64, radius: f64, color: &str, alpha: f64, palette: &[String]) -> String {
    let Some(idx) = palette.iter().position(|known| known == color) else {
        return String::new();
    };
    format!(
        "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fill=\"url(#glow-{idx})\" opacity=\"{alpha:.2}\"/>",
        radius.max(0.0)
    )
}

fn rounded_rect_svg(rect: &RoundedRect, paint: &str) -> String {
    let radius = rect.effective_radius();
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" {paint}/>",
        rect.x, rect.y, rect.width, rect.height
    )
}

fn text_block_svg(block: &TextBlockLayout, filter: Option<&str>) -> String {
    let mut text = String::new();
    let filter_attr = filter
        .map(|f| format!(" filter=\"{f}\""))
        .unwrap_or_default();
    text.push_str(&format!(
        "<g font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"middle\"{filter_attr}>",
        escape_xml(&block.font_family),
        block.fit.font_px,
        block.font_weight,
        escape_xml(&block.color),
    ));
    for (idx, line) in block.fit.lines.iter().enumerate() {
        let y = block.top_y + idx as f32 * block.line_height;
        text.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{y:.2}\" dominant-baseline=\"hanging\">{}</text>",
            block.center_x,
            escape_xml(line)
        ));
    }
    text.push_str("</g>");
    text
}

fn stem_svg(stem: &StemLayout, width: f64, color: &str) -> String {
    format!(
        "<path d=\"M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{width:.2}\" stroke-linecap=\"round\"/>",
        stem.start.0,
        stem.start.1,
        stem.control.0,
        stem.control.1,
        stem.end.0,
        stem.end.1,
        escape_xml(color)
    )
}

fn leaf_svg(leaf: &LeafLayout, vein_color: &str) -> String {
    let w = leaf.width;
    let h = leaf.height;
    let body = format!(
        "M 0 0 Q {:.2} {:.2} {:.2} {:.2} Q {:.2} {:.2} 0 {:.2} Q {:.2} {:.2} {:.2} {:.2} Q {:.2} {:.2} 0 0 Z",
        w * 0.55,
        -h * 0.15,
        w,
        -h * 0.55,
        w * 0.6,
        -h * 0.9,
        -h,
        -w * 0.6,
        -h * 0.9,
        -w,
        -h * 0.55,
        -w * 0.55,
        -h * 0.15,
    );
    let vein = format!("M 0 {:.2} Q 0 {:.2} 0 {:.2}", -h * 0.05, -h * 0.5, -h * 0.9);
    format!(
        "<g transform=\"translate({:.2} {:.2}) rotate({:.3})\"><path d=\"{body}\" fill=\"{}\" opacity=\"{LEAF_ALPHA}\"/><path d=\"{vein}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" opacity=\"{LEAF_VEIN_ALPHA}\"/></g>",
        leaf.x,
        leaf.y,
        leaf.rotation.to_degrees(),
        escape_xml(&leaf.fill),
        escape_xml(vein_color),
        (w * 0.08).max(1.0),
    )
}

fn ellipse_svg(ellipse: &EllipseLayout, fill: &str) -> String {
    format!(
        "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" transform=\"rotate({:.3} {:.2} {:.2})\" fill=\"{}\"/>",
        ellipse.cx,
        ellipse.cy,
        ellipse.rx,
        ellipse.ry,
        ellipse.rotation.to_degrees(),
        ellipse.cx,
        ellipse.cy,
        escape_xml(fill)
    )
}

fn wrap_svg(scene: &Scene, theme: &Theme) -> String {
    let wrap = &scene.wrap;
    let mut out = String::new();
    out.push_str(&rounded_rect_svg(
        &wrap.rect,
        &format!("fill=\"url(#wrap)\" opacity=\"{WRAP_ALPHA}\""),
    ));
    out.push_str(&rounded_rect_svg(
        &wrap.shadow,
        &format!(
            "fill=\"{}\" opacity=\"{WRAP_SHADOW_ALPHA}\"",
            escape_xml(&theme.wrap_shadow_color)
        ),
    ));
    out.push_str(&format!("<g opacity=\"{WRAP_ALPHA}\">"));
    for highlight in &wrap.highlights {
        out.push_str(&ellipse_svg(highlight, &theme.wrap_highlight_color));
    }
    out.push_str("</g>");
    out
}

fn petal_path(width: f64, height: f64) -> String {
    format!(
        "M 0 0 Q {:.2} {:.2} {:.2} {:.2} Q 0 {:.2} {:.2} {:.2} Q {:.2} {:.2} 0 0 Z",
        width * 0.65,
        -height * 0.25,
        width * 0.15,
        -height * 0.85,
        -height,
        -width * 0.15,
        -height * 0.85,
        -width * 0.65,
        -height * 0.25,
    )
}

fn flower_svg(flower: &FlowerShape, glow_colors: &[String]) -> String {
    let mut out = format!(
        "<g transform=\"translate({:.2} {:.2}) rotate({:.3})\">",
        flower.x,
        flower.y,
        flower.rotation.to_degrees()
    );
    out.push_str(&glow_circle(
        0.0,
        0.0,
        flower.glow_radius(),
        flower.petal_color,
        FLOWER_GLOW_ALPHA,
        glow_colors,
    ));
    for petal in &flower.petals {
        out.push_str(&format!(
            "<path transform=\"rotate({:.3})\" d=\"{}\" fill=\"{}\" fill-opacity=\"{PETAL_ALPHA}\"/>",
            petal.angle.to_degrees(),
            petal_path(petal.width, petal.height),
            petal.color
        ));
    }
    out.push_str(&format!(
        "<circle r=\"{:.2}\" fill=\"{}\"/>",
        flower.center_radius, flower.center_color
    ));
    for dot in &flower.seeds {
        out.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"#000000\" fill-opacity=\"{SEED_DOT_ALPHA}\"/>",
            dot.x, dot.y, dot.radius
        ));
    }
    out.push_str("</g>");
    out
}

fn watermark_svg(watermark: &WatermarkLayout, color: &str) -> String {
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">{}</text>",
        watermark.x,
        watermark.y,
        escape_xml(&watermark.font_family),
        watermark.font_px,
        watermark.font_weight,
        escape_xml(color),
        escape_xml(&watermark.text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "wrote svg");
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("generated SVG could not be parsed: {0}")]
    Svg(#[from] usvg::Error),
    #[error("failed to allocate {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Rasterizes an SVG document to PNG bytes at `scale`.
#[cfg(feature = "png")]
pub fn render_png(svg: &str, scale: f32) -> std::result::Result<Vec<u8>, RasterError> {
    let generics = crate::text_metrics::generic_font_families();
    let mut opt = usvg::Options::default();
    let fontdb = opt.fontdb_mut();
    fontdb.load_system_fonts();
    if let Some(serif) = &generics.serif {
        fontdb.set_serif_family(serif.as_str());
    }
    if let Some(sans) = &generics.sans_serif {
        fontdb.set_sans_serif_family(sans.as_str());
        opt.font_family = sans.clone();
    } else {
        tracing::warn!("no system fonts found; card text will not be painted");
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let width = ((size.width() as f32) * scale).ceil().max(1.0) as u32;
    let height = ((size.height() as f32) * scale).ceil().max(1.0) as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(RasterError::Allocation { width, height })?;

    let transform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|err| RasterError::Encode(err.to_string()))
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &crate::config::RenderConfig) -> Result<()> {
    let png = render_png(svg, render_cfg.effective_scale())?;
    std::fs::write(output, &png)?;
    tracing::info!(path = %output.display(), bytes = png.len(), "wrote png");
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::input::BouquetInput;
    use crate::layout::compute_scene;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.text.fast_text_metrics = true;
        config
    }

    fn render(input: &BouquetInput) -> String {
        let config = fast_config();
        let scene = compute_scene(input, &config);
        render_svg(&scene, &config.theme)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render(&BouquetInput::new("Sam").with_tagline("be mine"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"1200\" height=\"1500\""));
        assert!(svg.contains(">Sam</text>"));
        assert!(svg.contains(">be mine</text>"));
        assert!(svg.contains("tadinada.com/valentine"));
    }

    #[test]
    fn identical_inputs_give_identical_documents() {
        let input = BouquetInput::new("Alex").with_variation(12);
        assert_eq!(render(&input), render(&input));
    }

    #[test]
    fn watermark_can_be_hidden() {
        let svg = render(&BouquetInput::new("Sam").with_watermark(false));
        assert!(!svg.contains("tadinada.com/valentine"));
    }

    #[test]
    fn text_is_escaped() {
        let svg = render(&BouquetInput::new("<Al & Bo>"));
        assert!(svg.contains("&lt;Al &amp; Bo&gt;"));
        assert!(!svg.contains("<Al"));
        assert!(svg.contains("&quot;Times New Roman&quot;"));
    }

    #[test]
    fn every_flower_is_painted_with_its_petals() {
        let config = fast_config();
        let scene = compute_scene(&BouquetInput::new("Daisy"), &config);
        let svg = render_svg(&scene, &config.theme);
        let petal_paths = svg.matches("fill-opacity=\"0.95\"").count();
        let expected: usize = scene.flowers.iter().map(|f| f.petals.len()).sum();
        assert_eq!(petal_paths, expected);
    }

    #[test]
    fn glow_gradients_are_deduplicated() {
        let config = fast_config();
        let scene = compute_scene(&BouquetInput::new("Sam"), &config);
        let palette = glow_palette(&scene);
        let mut sorted = palette.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), palette.len());
        for glow in &scene.glows {
            assert!(palette.contains(&glow.color));
        }
    }

    #[test]
    fn escape_xml_handles_quotes() {
        assert_eq!(escape_xml("a\"b'c"), "a&quot;b&apos;c");
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_is_reproducible_and_sized() {
        let svg = render(&BouquetInput::new("Sam").with_variation(2));
        let a = render_png(&svg, 0.25).unwrap();
        let b = render_png(&svg, 0.25).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
        // IHDR width and height, big-endian.
        let width = u32::from_be_bytes([a[16], a[17], a[18], a[19]]);
        let height = u32::from_be_bytes([a[20], a[21], a[22], a[23]]);
        assert_eq!((width, height), (300, 375));
    }

    #[cfg(feature = "png")]
    #[test]
    fn card_text_reaches_the_raster() {
        if crate::text_metrics::generic_font_families().serif.is_none() {
            return;
        }
        let input = BouquetInput::new("Sam").with_tagline("be mine");
        let with_mark = render_png(&render(&input), 0.25).unwrap();
        let without_mark = render_png(&render(&input.clone().with_watermark(false)), 0.25).unwrap();
        assert_ne!(with_mark, without_mark);

        let other_tagline = render_png(&render(&input.with_tagline("be true")), 0.25).unwrap();
        assert_ne!(with_mark, other_tagline);
    }

    #[cfg(feature = "png")]
    #[test]
    fn broken_svg_is_an_error() {
        assert!(matches!(render_png("<svg", 1.0), Err(RasterError::Svg(_))));
    }
}
