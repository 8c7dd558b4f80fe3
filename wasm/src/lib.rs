use serde::Deserialize;
use valentine_bouquet::{BouquetInput, RenderOptions, render_with_options};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BouquetRenderOptions {
    name: Option<String>,
    tagline: Option<String>,
    variation: Option<u32>,
    show_watermark: Option<bool>,
    theme: Option<String>,
    font_family: Option<String>,
    fast_text: Option<bool>,
}

fn build_input(options: &BouquetRenderOptions) -> BouquetInput {
    BouquetInput::new(options.name.clone().unwrap_or_default())
        .with_tagline(options.tagline.clone().unwrap_or_default())
        .with_variation(options.variation.unwrap_or(0))
        .with_watermark(options.show_watermark.unwrap_or(true))
}

fn build_render_options(options: &BouquetRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("daylight") {
        RenderOptions::daylight()
    } else {
        RenderOptions::valentine()
    };

    if let Some(font_family) = &options.font_family {
        render_options.theme.title_font_family = font_family.clone();
        render_options.theme.tagline_font_family = font_family.clone();
    }
    // No system fonts in the browser; the width table is the default there.
    if options.fast_text.unwrap_or(true) {
        render_options = render_options.with_fast_text();
    }

    render_options
}

#[wasm_bindgen]
pub fn render_bouquet_svg(options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<BouquetRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        BouquetRenderOptions::default()
    };

    let input = build_input(&options);
    Ok(render_with_options(&input, build_render_options(&options)))
}

#[cfg(test)]
mod tests {
    use valentine_bouquet::render_with_options;

    use crate::{BouquetRenderOptions, build_input, build_render_options};

    #[test]
    fn renders_named_bouquet() {
        let options: BouquetRenderOptions = serde_json::from_str(
            r#"{"name": "Juliet", "tagline": "forever", "variation": 2, "theme": "daylight"}"#,
        )
        .unwrap();
        let input = build_input(&options);
        assert_eq!(input.variation, 2);

        let svg = render_with_options(&input, build_render_options(&options));
        assert!(svg.contains("<svg"));
        assert!(svg.contains(">Juliet</text>"));
        assert!(svg.contains(">forever</text>"));
    }

    #[test]
    fn defaults_render_the_placeholder_card() {
        let options = BouquetRenderOptions::default();
        let svg = render_with_options(&build_input(&options), build_render_options(&options));
        assert!(svg.contains(">Your Valentine</text>"));
        assert!(svg.contains("tadinada.com/valentine"));
    }
}
