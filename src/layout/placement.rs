use serde::Serialize;

use crate::flowers::FlowerKind;
use crate::rng::{Rng, clamp};

pub const FLOWERS_PER_RING: usize = 8;

const RING_GAP_Y: f64 = 120.0;
const FAN_ANGLE: f64 = 1.25;
const MAX_SPREAD_X: f64 = 450.0;
const TOP_Y: f64 = 585.0;
const ARC_SAG: f64 = 40.0;
const POSITION_JITTER: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowerPlacement {
    pub kind: FlowerKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Radians.
    pub rotation: f64,
    /// Ring index; ring 0 is the top arc and is drawn last.
    pub layer: usize,
}

/// Fans `kinds` across concentric arcs of up to eight flowers, centered on
/// `width / 2`. Takes four draws per flower, in order.
pub fn layout_flowers(kinds: &[FlowerKind], rng: &mut Rng, width: f64) -> Vec<FlowerPlacement> {
    let count = kinds.len();
    let center_x = width / 2.0;

    kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let ring = i / FLOWERS_PER_RING;
            let idx = i % FLOWERS_PER_RING;
            let count_in_ring = FLOWERS_PER_RING.min(count - ring * FLOWERS_PER_RING);

            let t = if count_in_ring <= 1 {
                0.5
            } else {
                idx as f64 / (count_in_ring - 1) as f64
            };
            let angle = (t - 0.5) * FAN_ANGLE;
            let spread = MAX_SPREAD_X * (0.98 + ring as f64 * 0.06);

            let x = center_x + angle.sin() * spread + rng.jitter(POSITION_JITTER);
            let y = TOP_Y
                + ring as f64 * RING_GAP_Y
                + (angle.cos() - 1.0) * ARC_SAG
                + rng.jitter(POSITION_JITTER);
            let size = clamp(70.0 - ring as f64 * 8.0 + rng.next_f64() * 8.0, 38.0, 78.0);
            let rotation = angle * 0.28 + rng.jitter(0.2);

            FlowerPlacement {
                kind,
                x,
                y,
                size,
                rotation,
                layer: ring,
            }
        })
        .collect()
}
