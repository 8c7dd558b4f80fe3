use crate::flowers::FlowerKind;
use crate::layout::{Scene, TextFit};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub seed: i32,
    pub width: f64,
    pub height: f64,
    pub kinds: Vec<FlowerKind>,
    pub title: TextDump,
    pub tagline: TextDump,
    pub flowers: Vec<FlowerDump>,
    pub leaves: usize,
    pub watermark: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TextDump {
    pub font_px: u32,
    pub lines: Vec<String>,
    pub top_y: f32,
    pub line_height: f32,
    pub max_width: f32,
}

#[derive(Debug, Serialize)]
pub struct FlowerDump {
    pub kind: FlowerKind,
    pub layer: usize,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub rotation: f64,
    pub petal_color: String,
    pub petals: usize,
    pub seed_dots: usize,
}

impl TextDump {
    fn new(fit: &TextFit, top_y: f32, line_height: f32, max_width: f32) -> Self {
        Self {
            font_px: fit.font_px,
            lines: fit.lines.clone(),
            top_y,
            line_height,
            max_width,
        }
    }
}

impl SceneDump {
    /// Flowers are listed in paint order, back ring first.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut layers: Vec<usize> = scene.placements.iter().map(|p| p.layer).collect();
        layers.sort_by(|a, b| b.cmp(a));

        let flowers = scene
            .flowers
            .iter()
            .zip(layers)
            .map(|(flower, layer)| FlowerDump {
                kind: flower.kind,
                layer,
                x: flower.x,
                y: flower.y,
                size: flower.size,
                rotation: flower.rotation,
                petal_color: flower.petal_color.to_string(),
                petals: flower.petals.len(),
                seed_dots: flower.seeds.len(),
            })
            .collect();

        SceneDump {
            seed: scene.seed,
            width: scene.width,
            height: scene.height,
            kinds: scene.kinds.clone(),
            title: TextDump::new(
                &scene.title.fit,
                scene.title.top_y,
                scene.title.line_height,
                scene.title.max_width,
            ),
            tagline: TextDump::new(
                &scene.tagline.fit,
                scene.tagline.top_y,
                scene.tagline.line_height,
                scene.tagline.max_width,
            ),
            flowers,
            leaves: scene.leaves.len(),
            watermark: scene.watermark.as_ref().map(|w| w.text.clone()),
        }
    }
}

pub fn write_scene_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    tracing::debug!(path = %path.display(), "wrote scene dump");
    Ok(())
}
