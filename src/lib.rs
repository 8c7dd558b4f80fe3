#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod flowers;
pub mod input;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod rng;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, TextConfig, load_config, parse_config};
pub use flowers::{FlowerKind, FlowerShape, draw_flower, letter_to_kind};
pub use input::{BouquetInput, ResolvedBouquet, download_file_name};
pub use layout::{
    CANVAS_HEIGHT, CANVAS_WIDTH, FlowerPlacement, Scene, TextFit, TextMeasure, compute_scene,
    fit_text, layout_flowers,
};
#[cfg(feature = "png")]
pub use render::{RasterError, render_png};
pub use render::render_svg;
pub use rng::{Rng, hash_string_to_seed};
pub use theme::Theme;

/// Theme plus text and raster settings for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub text: TextConfig,
    pub render: RenderConfig,
}

impl RenderOptions {
    pub fn valentine() -> Self {
        Self::default()
    }

    pub fn daylight() -> Self {
        Self {
            theme: Theme::daylight(),
            ..Self::default()
        }
    }

    /// Measure text with the built-in width table; output no longer depends
    /// on installed fonts.
    pub fn with_fast_text(mut self) -> Self {
        self.text.fast_text_metrics = true;
        self
    }

    fn to_config(&self) -> Config {
        Config {
            theme: self.theme.clone(),
            text: self.text.clone(),
            render: self.render.clone(),
        }
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            text: config.text,
            render: config.render,
        }
    }
}

pub fn build_scene(input: &BouquetInput, options: &RenderOptions) -> Scene {
    compute_scene(input, &options.to_config())
}

/// Renders a bouquet card to an SVG document.
pub fn render_with_options(input: &BouquetInput, options: RenderOptions) -> String {
    let scene = build_scene(input, &options);
    render_svg(&scene, &options.theme)
}

/// Renders a bouquet card straight to PNG bytes at the configured scale.
#[cfg(feature = "png")]
pub fn render_png_with_options(
    input: &BouquetInput,
    options: RenderOptions,
) -> Result<Vec<u8>, RasterError> {
    let svg = render_with_options(input, options.clone());
    render_png(&svg, options.render.effective_scale())
}
