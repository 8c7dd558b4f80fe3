//! User-facing inputs: sanitizing free text, deriving the seed and flower
//! kinds, and naming the exported file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::flowers::{FlowerKind, letter_to_kind};
use crate::rng::{Rng, bouquet_seed};

pub const DEFAULT_DISPLAY_NAME: &str = "Your Valentine";
pub const DEFAULT_TAGLINE: &str = "a special bouquet for you";
pub const NAME_MAX_CHARS: usize = 32;
pub const TAGLINE_MAX_CHARS: usize = 64;
/// Bouquet size when the name has no letters to derive kinds from.
pub const FALLBACK_FLOWER_COUNT: usize = 14;
/// Upper bound (exclusive) for shuffled variations.
pub const SHUFFLE_RANGE: u32 = 1_000_000_000;

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static UNSAFE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());
static INVISIBLE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Cc}\p{Cf}]").unwrap());
static UNDERSCORE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Everything a render depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BouquetInput {
    pub name: String,
    pub tagline: String,
    pub variation: u32,
    pub show_watermark: bool,
}

impl Default for BouquetInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            tagline: String::new(),
            variation: 0,
            show_watermark: true,
        }
    }
}

impl BouquetInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = tagline.into();
        self
    }

    pub fn with_variation(mut self, variation: u32) -> Self {
        self.variation = variation;
        self
    }

    pub fn with_watermark(mut self, show: bool) -> Self {
        self.show_watermark = show;
        self
    }

    /// A fresh random variation, as the shuffle button picks.
    #[cfg(feature = "shuffle")]
    pub fn shuffled(self) -> Self {
        self.with_variation(shuffle_variation())
    }

    /// Back to the canonical arrangement for this name.
    pub fn reset_variation(self) -> Self {
        self.with_variation(0)
    }
}

/// The input resolved into what the scene builder consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBouquet {
    pub seed: i32,
    pub kinds: Vec<FlowerKind>,
    pub display_name: String,
    pub display_tagline: String,
    pub show_watermark: bool,
}

impl ResolvedBouquet {
    pub fn from_input(input: &BouquetInput) -> Self {
        let name = sanitize_text(&input.name, NAME_MAX_CHARS);
        let display_name = if name.is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            name
        };
        let tagline = sanitize_text(&input.tagline, TAGLINE_MAX_CHARS);
        let display_tagline = if tagline.is_empty() {
            DEFAULT_TAGLINE.to_string()
        } else {
            tagline
        };

        let seed = bouquet_seed(&display_name, input.variation);
        let kinds = kinds_for_name(&display_name, seed);

        Self {
            seed,
            kinds,
            display_name,
            display_tagline,
            show_watermark: input.show_watermark,
        }
    }
}

/// One flower per ASCII letter; names without letters get a random bouquet
/// drawn from a separate stream on the same seed.
pub fn kinds_for_name(name: &str, seed: i32) -> Vec<FlowerKind> {
    let letters: Vec<FlowerKind> = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(letter_to_kind)
        .collect();
    if !letters.is_empty() {
        return letters;
    }

    let mut rng = Rng::new(seed);
    (0..FALLBACK_FLOWER_COUNT)
        .map(|_| {
            rng.pick(&FlowerKind::ALL)
                .copied()
                .unwrap_or(FlowerKind::Sunflower)
        })
        .collect()
}

/// Drops control characters, trims, and caps the length in characters.
pub fn sanitize_text(raw: &str, max_chars: usize) -> String {
    let cleaned = INVISIBLE_CHARS_RE.replace_all(raw, "");
    let capped: String = cleaned.trim().chars().take(max_chars).collect();
    capped.trim_end().to_string()
}

#[cfg(feature = "shuffle")]
pub fn shuffle_variation() -> u32 {
    use rand::Rng as _;
    rand::rng().random_range(0..SHUFFLE_RANGE)
}

/// `bouquet_<slug>.png`, where the slug is the lowercased name reduced to
/// `[a-z0-9_-]`.
pub fn download_file_name(name: &str) -> String {
    let trimmed = name.trim();
    let base = if trimmed.is_empty() { "valentine" } else { trimmed };
    let lower = base.to_lowercase();
    let spaced = WHITESPACE_RUN_RE.replace_all(&lower, "_");
    let safe = UNSAFE_CHARS_RE.replace_all(&spaced, "_");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&safe, "_");
    let slug = collapsed.trim_matches('_');
    let slug = if slug.is_empty() { "valentine" } else { slug };
    format!("bouquet_{slug}.png")
}
