//! Flower catalog: which letters grow which flowers, their palettes, and the
//! per-kind procedure that resolves a placement into concrete petal geometry.

use serde::Serialize;
use std::f64::consts::TAU;

use crate::layout::FlowerPlacement;
use crate::rng::Rng;

/// Sizes below this collapse the petal geometry; placements are clamped to it.
pub const MIN_FLOWER_SIZE: f64 = 1.0;

const SEED_DOT_COUNT: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowerKind {
    Rose,
    Tulip,
    Daisy,
    Lily,
    Orchid,
    Sunflower,
}

impl FlowerKind {
    pub const ALL: [FlowerKind; 6] = [
        FlowerKind::Rose,
        FlowerKind::Tulip,
        FlowerKind::Daisy,
        FlowerKind::Lily,
        FlowerKind::Orchid,
        FlowerKind::Sunflower,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FlowerKind::Rose => "rose",
            FlowerKind::Tulip => "tulip",
            FlowerKind::Daisy => "daisy",
            FlowerKind::Lily => "lily",
            FlowerKind::Orchid => "orchid",
            FlowerKind::Sunflower => "sunflower",
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            FlowerKind::Rose => &ROSE,
            FlowerKind::Tulip => &TULIP,
            FlowerKind::Daisy => &DAISY,
            FlowerKind::Lily => &LILY,
            FlowerKind::Orchid => &ORCHID,
            FlowerKind::Sunflower => &SUNFLOWER,
        }
    }

    pub fn petal_count(self) -> usize {
        match self {
            FlowerKind::Rose => 10,
            FlowerKind::Tulip => 6,
            FlowerKind::Daisy => 12,
            FlowerKind::Lily => 7,
            FlowerKind::Orchid => 6,
            FlowerKind::Sunflower => 14,
        }
    }

    /// Center disc radius as a fraction of the flower size.
    pub fn center_ratio(self) -> f64 {
        match self {
            FlowerKind::Sunflower => 0.35,
            _ => 0.24,
        }
    }

    pub fn has_seed_dots(self) -> bool {
        matches!(self, FlowerKind::Sunflower | FlowerKind::Daisy)
    }
}

impl std::fmt::Display for FlowerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Buckets: A–D rose, E–H tulip, I–M daisy, N–R lily, S–V orchid, everything else sunflower.
pub fn letter_to_kind(letter: char) -> FlowerKind {
    match letter.to_ascii_lowercase() {
        'a'..='d' => FlowerKind::Rose,
        'e'..='h' => FlowerKind::Tulip,
        'i'..='m' => FlowerKind::Daisy,
        'n'..='r' => FlowerKind::Lily,
        's'..='v' => FlowerKind::Orchid,
        _ => FlowerKind::Sunflower,
    }
}

#[derive(Debug)]
pub struct Palette {
    pub petals: &'static [&'static str],
    pub accents: &'static [&'static str],
    pub centers: &'static [&'static str],
}

static ROSE: Palette = Palette {
    petals: &["#ff4d6d", "#ff758f", "#ff8fab", "#ff2e63"],
    accents: &["#ffd6e0", "#ffe5ec"],
    centers: &["#ffcad4", "#ffc2d1"],
};

static TULIP: Palette = Palette {
    petals: &["#ff6b6b", "#f06595", "#cc5de8", "#845ef7"],
    accents: &["#fff0f6", "#f8f0fc"],
    centers: &["#ffd8a8", "#ffe066"],
};

static DAISY: Palette = Palette {
    petals: &["#ffffff", "#fff7ff", "#f8f9fa"],
    accents: &["#ffd43b", "#ffe066"],
    centers: &["#ffb703", "#f59f00"],
};

static LILY: Palette = Palette {
    petals: &["#ffe3e3", "#ffc9c9", "#ffd6e0", "#ffe8f0"],
    accents: &["#fff0f6", "#fff5f5"],
    centers: &["#ffd8a8", "#ffa94d"],
};

static ORCHID: Palette = Palette {
    petals: &["#c77dff", "#9d4edd", "#e0aaff", "#b5179e"],
    accents: &["#f3d9fa", "#eebefa"],
    centers: &["#ffd6a5", "#ffadad"],
};

static SUNFLOWER: Palette = Palette {
    petals: &["#ffd43b", "#ffe066", "#fab005", "#fcc419"],
    accents: &["#fff3bf", "#ffec99"],
    centers: &["#6f4e37", "#5c4033", "#3f2d2b"],
};

#[derive(Debug, Clone, Serialize)]
pub struct Petal {
    /// Rotation around the flower center, radians.
    pub angle: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedDot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// A flower with every random choice already taken.
#[derive(Debug, Clone, Serialize)]
pub struct FlowerShape {
    pub kind: FlowerKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub rotation: f64,
    pub petal_color: &'static str,
    pub accent_color: &'static str,
    pub center_color: &'static str,
    pub petals: Vec<Petal>,
    pub center_radius: f64,
    pub seeds: Vec<SeedDot>,
}

impl FlowerShape {
    pub fn glow_radius(&self) -> f64 {
        self.size * 1.2
    }
}

pub fn draw_flower(placement: &FlowerPlacement, rng: &mut Rng) -> FlowerShape {
    let kind = placement.kind;
    let size = placement.size.max(MIN_FLOWER_SIZE);
    let palette = kind.palette();

    let petal_color = pick_color(rng, palette.petals);
    let accent_color = pick_color(rng, palette.accents);
    let center_color = pick_color(rng, palette.centers);

    let count = kind.petal_count();
    let mut petals = Vec::with_capacity(count);
    for i in 0..count {
        let angle = (i as f64 / count as f64) * TAU;
        // The lift draw never reaches the painted petal but stays in the stream.
        let _lift = size * (0.55 + rng.next_f64() * 0.12);
        let width = size * (0.55 + rng.next_f64() * 0.25);
        let height = size * (0.95 + rng.next_f64() * 0.35);
        petals.push(Petal {
            angle,
            width,
            height,
            color: if i % 2 == 0 { petal_color } else { accent_color },
        });
    }

    let mut seeds = Vec::new();
    if kind.has_seed_dots() {
        seeds.reserve(SEED_DOT_COUNT);
        for _ in 0..SEED_DOT_COUNT {
            let angle = rng.next_f64() * TAU;
            let radius = rng.next_f64() * size * 0.22;
            seeds.push(SeedDot {
                x: angle.cos() * radius,
                y: angle.sin() * radius,
                radius: size * 0.03,
            });
        }
    }

    FlowerShape {
        kind,
        x: placement.x,
        y: placement.y,
        size,
        rotation: placement.rotation,
        petal_color,
        accent_color,
        center_color,
        petals,
        center_radius: size * kind.center_ratio(),
        seeds,
    }
}

fn pick_color(rng: &mut Rng, colors: &'static [&'static str]) -> &'static str {
    rng.pick(colors).copied().unwrap_or("#ffffff")
}

/// Control point of the quadratic stem curve from `(x0, y0)` to `(x1, y1)`.
pub fn stem_control_point(x0: f64, y0: f64, x1: f64, y1: f64) -> (f64, f64) {
    (
        (x0 + x1) / 2.0 + (x0 - x1) * 0.08,
        (y0 + y1) / 2.0 + (y1 - y0) * 0.12,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(kind: FlowerKind, size: f64) -> FlowerPlacement {
        FlowerPlacement {
            kind,
            x: 600.0,
            y: 585.0,
            size,
            rotation: 0.1,
            layer: 0,
        }
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(letter_to_kind('A'), FlowerKind::Rose);
        assert_eq!(letter_to_kind('D'), FlowerKind::Rose);
        assert_eq!(letter_to_kind('E'), FlowerKind::Tulip);
        assert_eq!(letter_to_kind('h'), FlowerKind::Tulip);
        assert_eq!(letter_to_kind('i'), FlowerKind::Daisy);
        assert_eq!(letter_to_kind('M'), FlowerKind::Daisy);
        assert_eq!(letter_to_kind('n'), FlowerKind::Lily);
        assert_eq!(letter_to_kind('R'), FlowerKind::Lily);
        assert_eq!(letter_to_kind('s'), FlowerKind::Orchid);
        assert_eq!(letter_to_kind('V'), FlowerKind::Orchid);
        assert_eq!(letter_to_kind('w'), FlowerKind::Sunflower);
        assert_eq!(letter_to_kind('Z'), FlowerKind::Sunflower);
    }

    #[test]
    fn every_latin_letter_is_case_insensitive() {
        for (upper, lower) in ('A'..='Z').zip('a'..='z') {
            assert_eq!(letter_to_kind(upper), letter_to_kind(lower), "{upper}");
        }
    }

    #[test]
    fn out_of_range_input_uses_default_bucket() {
        for ch in ['1', ' ', '#', 'é', '\u{1F339}'] {
            assert_eq!(letter_to_kind(ch), FlowerKind::Sunflower, "{ch:?}");
        }
    }

    #[test]
    fn drawing_is_reproducible() {
        for kind in FlowerKind::ALL {
            let a = draw_flower(&placement(kind, 64.0), &mut Rng::new(77));
            let b = draw_flower(&placement(kind, 64.0), &mut Rng::new(77));
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );
        }
    }

    #[test]
    fn petal_and_seed_counts_follow_kind() {
        for kind in FlowerKind::ALL {
            let shape = draw_flower(&placement(kind, 60.0), &mut Rng::new(5));
            assert_eq!(shape.petals.len(), kind.petal_count());
            let expected_seeds = if kind.has_seed_dots() { SEED_DOT_COUNT } else { 0 };
            assert_eq!(shape.seeds.len(), expected_seeds);
            assert!(kind.palette().petals.contains(&shape.petal_color));
            assert!(kind.palette().centers.contains(&shape.center_color));
        }
    }

    #[test]
    fn draws_consumed_per_kind() {
        // 3 palette picks, 3 per petal, 2 per seed dot.
        for kind in FlowerKind::ALL {
            let mut used = Rng::new(11);
            draw_flower(&placement(kind, 60.0), &mut used);
            let mut expected = Rng::new(11);
            let seed_draws = if kind.has_seed_dots() { SEED_DOT_COUNT * 2 } else { 0 };
            for _ in 0..(3 + kind.petal_count() * 3 + seed_draws) {
                expected.next_u32();
            }
            assert_eq!(used.next_u32(), expected.next_u32(), "{kind}");
        }
    }

    #[test]
    fn degenerate_size_is_clamped() {
        let shape = draw_flower(&placement(FlowerKind::Daisy, -4.0), &mut Rng::new(3));
        assert_eq!(shape.size, MIN_FLOWER_SIZE);
        assert!(shape.petals.iter().all(|p| p.width > 0.0 && p.height > 0.0));
        assert!(shape.center_radius > 0.0);
    }

    #[test]
    fn petals_alternate_colors() {
        let shape = draw_flower(&placement(FlowerKind::Rose, 60.0), &mut Rng::new(8));
        for (i, petal) in shape.petals.iter().enumerate() {
            let expected = if i % 2 == 0 { shape.petal_color } else { shape.accent_color };
            assert_eq!(petal.color, expected);
        }
    }

    #[test]
    fn stem_bends_toward_origin() {
        let (cx, cy) = stem_control_point(600.0, 1290.0, 400.0, 600.0);
        assert!((cx - 516.0).abs() < 1e-3);
        assert!((cy - 862.2).abs() < 1e-3);
    }
}
