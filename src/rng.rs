//! Seed derivation and the deterministic random stream shared by layout and drawing.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const OUTPUT_RESOLUTION: u32 = 1_000_000;

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}

/// FNV-1a over the UTF-16 code units of `input`, reinterpreted as a signed 32-bit seed.
pub fn hash_string_to_seed(input: &str) -> i32 {
    let mut hash = FNV_OFFSET_BASIS;
    for unit in input.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash as i32
}

/// Seed for a given name and variation index.
pub fn bouquet_seed(name: &str, variation: u32) -> i32 {
    hash_string_to_seed(&format!("{name}#{variation}"))
}

/// xorshift32 stream. Every consumer pulls from the same stream in a fixed
/// order, so a seed fully determines the picture.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: i32) -> Self {
        Self { state: seed as u32 }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next value in `[0, 1)`, quantized to millionths.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() % OUTPUT_RESOLUTION) as f64 / OUTPUT_RESOLUTION as f64
    }

    /// Uniform index into a collection of `len` items. Always consumes one
    /// draw, even when `len` is zero.
    pub fn next_index(&mut self, len: usize) -> Option<usize> {
        let roll = self.next_f64();
        if len == 0 {
            return None;
        }
        Some(((roll * len as f64) as usize).min(len - 1))
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.next_index(items.len()).and_then(|idx| items.get(idx))
    }

    /// Centered jitter in `[-amplitude / 2, amplitude / 2)`.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() - 0.5) * amplitude
    }
}
