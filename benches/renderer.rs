use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use valentine_bouquet::config::Config;
use valentine_bouquet::input::BouquetInput;
use valentine_bouquet::layout::{FontMeasure, compute_scene, fit_tagline, fit_title};
use valentine_bouquet::render::render_svg;

const NAMES: [(&str, &str); 5] = [
    ("short", "Sam"),
    ("medium", "Penelope Rose"),
    ("long", "Bartholomew Featherstonehaugh"),
    ("letterless", "1234 !!"),
    ("max_length", "Maximilian Alexander Fitzgerald "),
];

fn fast_config() -> Config {
    let mut config = Config::default();
    config.text.fast_text_metrics = true;
    config
}

fn bench_text_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_fit");
    let measure = FontMeasure {
        family: "Georgia, serif",
        weight: 700,
        fast_metrics: true,
    };
    for (label, name) in NAMES {
        group.bench_with_input(BenchmarkId::new("title", label), name, |b, data| {
            b.iter(|| black_box(fit_title(&measure, black_box(data), 820.0, (86, 44))));
        });
    }
    let tagline = "a very long tagline with, many words that will not fit on one line";
    group.bench_function("tagline", |b| {
        b.iter(|| black_box(fit_tagline(&measure, black_box(tagline), 754.4, (30, 20))));
    });
    group.finish();
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    let config = fast_config();
    for (label, name) in NAMES {
        let input = BouquetInput::new(name).with_variation(7);
        group.bench_with_input(BenchmarkId::from_parameter(label), &input, |b, data| {
            b.iter(|| {
                let scene = compute_scene(black_box(data), &config);
                black_box(scene.flowers.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = fast_config();
    for (label, name) in NAMES {
        let scene = compute_scene(&BouquetInput::new(name), &config);
        group.bench_with_input(BenchmarkId::from_parameter(label), &scene, |b, data| {
            b.iter(|| {
                let svg = render_svg(black_box(data), &config.theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

#[cfg(feature = "png")]
fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_png");
    group.sample_size(10);
    let config = fast_config();
    let scene = compute_scene(&BouquetInput::new("Penelope Rose"), &config);
    let svg = render_svg(&scene, &config.theme);
    for scale in [0.5f32, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(scale), &svg, |b, data| {
            b.iter(|| {
                let png = valentine_bouquet::render::render_png(black_box(data), scale)
                    .expect("rasterize failed");
                black_box(png.len());
            });
        });
    }
    group.finish();
}

#[cfg(not(feature = "png"))]
fn bench_png(_c: &mut Criterion) {}

criterion_group!(benches, bench_text_fit, bench_scene, bench_render, bench_png);
criterion_main!(benches);
