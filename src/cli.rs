use crate::config::{Config, load_config};
use crate::input::{BouquetInput, ResolvedBouquet, download_file_name};
use crate::layout::compute_scene_resolved;
use crate::layout_dump::write_scene_dump;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bouquet", version, about = "Render a seeded Valentine bouquet card")]
pub struct Args {
    /// Name the bouquet is for; each letter becomes a flower
    #[arg(short = 'n', long = "name", default_value = "")]
    pub name: String,

    /// Line under the name
    #[arg(short = 't', long = "tagline", default_value = "")]
    pub tagline: String,

    /// Arrangement index; 0 is the canonical bouquet for a name
    #[arg(short = 'v', long = "variation", default_value_t = 0)]
    pub variation: u32,

    /// Pick a random variation (printed to stderr so it can be reproduced)
    #[arg(long = "shuffle", conflicts_with = "variation")]
    pub shuffle: bool,

    /// Leave the watermark off the card
    #[arg(long = "no-watermark")]
    pub no_watermark: bool,

    /// Output file. SVG defaults to stdout, PNG to bouquet_<name>.png.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "png")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme preset, themeVariables, text, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// PNG scale factor (0.1 to 4.0)
    #[arg(short = 's', long = "scale")]
    pub scale: Option<f32>,

    /// Measure text with the built-in width table instead of system fonts
    #[arg(long = "fast-text")]
    pub fast_text: bool,

    /// Write the resolved scene as JSON to this path
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,valentine_bouquet=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

pub fn run() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();
    execute(args)
}

pub fn execute(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    let input = bouquet_input(&args);
    if args.shuffle {
        tracing::info!(variation = input.variation, "shuffled variation");
    }

    let bouquet = ResolvedBouquet::from_input(&input);
    let scene = compute_scene_resolved(&bouquet, &config);
    if let Some(path) = args.dump_layout.as_deref() {
        write_scene_dump(path, &scene)?;
    }
    let svg = render_svg(&scene, &config.theme);

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| default_png_path(&input));
            write_png(&svg, &output, &config)
        }
    }
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(scale) = args.scale {
        config.render.scale = scale;
    }
    if args.fast_text {
        config.text.fast_text_metrics = true;
    }
    Ok(config)
}

/// Named after what the user typed, not the display fallback.
fn default_png_path(input: &BouquetInput) -> PathBuf {
    PathBuf::from(download_file_name(&input.name))
}

fn bouquet_input(args: &Args) -> BouquetInput {
    let input = BouquetInput::new(args.name.clone())
        .with_tagline(args.tagline.clone())
        .with_variation(args.variation)
        .with_watermark(!args.no_watermark);
    if args.shuffle { input.shuffled() } else { input }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &std::path::Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &std::path::Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature; use --outputFormat svg"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("bouquet").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_flags() {
        let args = parse(&[
            "-n", "Sam", "-t", "be mine", "-v", "7", "--no-watermark", "-e", "svg", "--scale", "2",
        ]);
        assert_eq!(args.name, "Sam");
        assert_eq!(args.variation, 7);
        assert_eq!(args.output_format, OutputFormat::Svg);
        let input = bouquet_input(&args);
        assert_eq!(input.tagline, "be mine");
        assert!(!input.show_watermark);
        assert_eq!(resolve_config(&args).unwrap().render.scale, 2.0);
    }

    #[test]
    fn shuffle_conflicts_with_variation() {
        let result = Args::try_parse_from(["bouquet", "--shuffle", "-v", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn writes_svg_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let svg_path = dir.path().join("card.svg");
        let dump_path = dir.path().join("scene.json");
        let args = parse(&[
            "-n",
            "Robin",
            "-e",
            "svg",
            "--fast-text",
            "-o",
            svg_path.to_str().unwrap(),
            "--dump-layout",
            dump_path.to_str().unwrap(),
        ]);
        execute(args).unwrap();
        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg.contains(">Robin</text>"));
        let dump = std::fs::read_to_string(&dump_path).unwrap();
        assert!(dump.contains("\"kinds\""));
    }

    #[test]
    fn default_png_name_comes_from_the_typed_name() {
        let unnamed = bouquet_input(&parse(&[]));
        assert_eq!(default_png_path(&unnamed), PathBuf::from("bouquet_valentine.png"));
        let blank = bouquet_input(&parse(&["-n", "   "]));
        assert_eq!(default_png_path(&blank), PathBuf::from("bouquet_valentine.png"));
        let named = bouquet_input(&parse(&["-n", "Mary Jane"]));
        assert_eq!(default_png_path(&named), PathBuf::from("bouquet_mary_jane.png"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = parse(&["-c", "/nonexistent/bouquet.json", "-e", "svg"]);
        assert!(execute(args).is_err());
    }
}
