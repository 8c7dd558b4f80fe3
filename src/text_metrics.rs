use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

// Bump when family resolution changes so stale cached faces are ignored.
const FACE_CACHE_VERSION: u32 = 2;

const SERIF_CANDIDATES: &[&str] = &[
    "Times New Roman",
    "Georgia",
    "DejaVu Serif",
    "Liberation Serif",
    "Noto Serif",
    "FreeSerif",
];
const SANS_SERIF_CANDIDATES: &[&str] = &[
    "Arial",
    "Helvetica",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "FreeSans",
];

/// Installed families standing in for the CSS `serif` and `sans-serif`
/// keywords. The rasterizer must use the same mapping as the measurer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericFamilies {
    pub serif: Option<String>,
    pub sans_serif: Option<String>,
}

/// Resolves the generic families against the system font database, loading
/// it on first use.
pub fn generic_font_families() -> GenericFamilies {
    match TEXT_MEASURER.lock() {
        Ok(mut guard) => guard.generic_families().clone(),
        Err(_) => GenericFamilies::default(),
    }
}

/// Advance width of `text` in pixels using the first installed font that
/// matches `font_family` (a CSS-style fallback list) at `weight`.
/// Returns `None` when no font can be resolved.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, weight: u16) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, weight)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    weight: u16,
}

impl FaceKey {
    fn new(font_family: &str, weight: u16) -> Self {
        let trimmed = font_family.trim();
        let family = if trimmed.is_empty() {
            "sans-serif".to_string()
        } else {
            trimmed.to_string()
        };
        Self { family, weight }
    }

    fn cache_stem(&self) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        FACE_CACHE_VERSION.hash(&mut hasher);
        self.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

struct TextMeasurer {
    db: Database,
    generics: Option<GenericFamilies>,
    faces: HashMap<FaceKey, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            generics: None,
            faces: HashMap::new(),
        }
    }

    fn generic_families(&mut self) -> &GenericFamilies {
        if self.generics.is_none() {
            self.db.load_system_fonts();
            let generics = resolve_generic_families(&self.db);
            if let Some(serif) = &generics.serif {
                self.db.set_serif_family(serif.as_str());
            }
            if let Some(sans) = &generics.sans_serif {
                self.db.set_sans_serif_family(sans.as_str());
            }
            tracing::debug!(serif = ?generics.serif, sans_serif = ?generics.sans_serif, "generic font families");
            self.generics = Some(generics);
        }
        self.generics.get_or_insert_with(GenericFamilies::default)
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, weight: u16) -> Option<f32> {
        let key = FaceKey::new(font_family, weight);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(&key);
            if face.is_some() {
                tracing::debug!(family = %key.family, weight, "resolved font face");
            } else {
                tracing::warn!(family = %key.family, weight, "no installed font matches; measuring with the width table");
            }
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key).and_then(|face| face.as_mut())?;
        face.measure_width(text, font_size)
    }

    fn load_face(&mut self, key: &FaceKey) -> Option<FontFace> {
        if let Some(face) = load_cached_face(key) {
            return Some(face);
        }

        self.generic_families();

        let names = parse_family_list(&key.family);
        let families: Vec<Family<'_>> = names.iter().map(FamilyToken::as_family).collect();

        let query = Query {
            families: &families,
            weight: Weight(key.weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if Face::parse(&bytes, index).is_ok() {
                store_cached_face(key, &bytes, index);
                loaded = FontFace::new(bytes, index);
            }
        });
        loaded
    }
}

enum FamilyToken {
    Generic(Family<'static>),
    Name(String),
}

impl FamilyToken {
    fn as_family(&self) -> Family<'_> {
        match self {
            FamilyToken::Generic(family) => *family,
            FamilyToken::Name(name) => Family::Name(name.as_str()),
        }
    }
}

fn parse_family_list(font_family: &str) -> Vec<FamilyToken> {
    let mut tokens = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let token = match raw.to_ascii_lowercase().as_str() {
            "serif" => FamilyToken::Generic(Family::Serif),
            "sans-serif" => FamilyToken::Generic(Family::SansSerif),
            "monospace" => FamilyToken::Generic(Family::Monospace),
            "cursive" => FamilyToken::Generic(Family::Cursive),
            "fantasy" => FamilyToken::Generic(Family::Fantasy),
            _ => FamilyToken::Name(raw.to_string()),
        };
        tokens.push(token);
    }
    if tokens.is_empty() {
        tokens.push(FamilyToken::Generic(Family::SansSerif));
    }
    tokens
}

fn resolve_generic_families(db: &Database) -> GenericFamilies {
    GenericFamilies {
        serif: pick_installed_family(db, SERIF_CANDIDATES, |name| {
            name.contains("Serif") && !name.contains("Sans")
        }),
        sans_serif: pick_installed_family(db, SANS_SERIF_CANDIDATES, |name| {
            name.contains("Sans") && !name.contains("Mono")
        }),
    }
}

/// First candidate that is installed, else the first installed family
/// accepted by `fallback`, else any installed family.
fn pick_installed_family(
    db: &Database,
    candidates: &[&str],
    fallback: impl Fn(&str) -> bool,
) -> Option<String> {
    let installed: Vec<&str> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str()))
        .collect();
    candidates
        .iter()
        .find(|candidate| installed.contains(*candidate))
        .map(|name| name.to_string())
        .or_else(|| installed.iter().find(|name| fallback(name)).map(|name| name.to_string()))
        .or_else(|| installed.first().map(|name| name.to_string()))
}

/// Parsed face bytes plus an ASCII advance table; non-ASCII glyphs are
/// looked up on demand and memoized.
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        let mut face: Option<Face<'_>> = None;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|adv| *adv > 0)
            } else if let Some(cached) = self.advance_cache.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Face::parse(&self.data, self.index).ok();
                }
                let value = face
                    .as_ref()
                    .and_then(|parsed| parsed.glyph_index(ch))
                    .and_then(|glyph| face.as_ref()?.glyph_hor_advance(glyph));
                self.advance_cache.insert(ch, value);
                value
            };
            width += match advance {
                Some(units) => units as f32 * scale,
                None => fallback,
            };
        }

        Some(width.max(0.0))
    }
}

fn cache_paths(key: &FaceKey) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let stem = key.cache_stem();
    let dir = base.join("valentine-bouquet").join("font-cache");
    Some((dir.join(format!("{stem}.font")), dir.join(format!("{stem}.meta"))))
}

fn store_cached_face(key: &FaceKey, bytes: &[u8], index: u32) {
    let Some((font_path, meta_path)) = cache_paths(key) else {
        return;
    };
    if font_path.exists() {
        return;
    }
    if let Some(parent) = font_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Err(err) = fs::write(&font_path, bytes).and_then(|_| fs::write(&meta_path, index.to_string())) {
        tracing::debug!(path = %font_path.display(), %err, "font cache write skipped");
    }
}

fn load_cached_face(key: &FaceKey) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(measure_text_width("", 30.0, "serif", 400), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "serif", 400), Some(0.0));
    }

    #[test]
    fn family_list_maps_generic_names() {
        let tokens = parse_family_list(r#"ui-serif, Georgia, "Times New Roman", serif"#);
        assert_eq!(tokens.len(), 4);
        assert!(matches!(&tokens[0], FamilyToken::Name(name) if name == "ui-serif"));
        assert!(matches!(&tokens[2], FamilyToken::Name(name) if name == "Times New Roman"));
        assert!(matches!(tokens[3], FamilyToken::Generic(Family::Serif)));
    }

    #[test]
    fn empty_database_has_no_generic_families() {
        let db = Database::new();
        assert_eq!(resolve_generic_families(&db), GenericFamilies::default());
    }

    #[test]
    fn generic_families_point_at_installed_fonts() {
        let generics = generic_font_families();
        let mut db = Database::new();
        db.load_system_fonts();
        let installed: Vec<String> = db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        if installed.is_empty() {
            assert_eq!(generics, GenericFamilies::default());
            return;
        }
        for family in [&generics.serif, &generics.sans_serif] {
            let family = family.as_ref().unwrap();
            assert!(installed.contains(family), "{family} is not installed");
        }
    }

    #[test]
    fn generic_fallbacks_measure_with_a_real_face() {
        if generic_font_families().sans_serif.is_none() {
            return;
        }
        let narrow = measure_text_width("iiii", 30.0, "No Such Family, sans-serif", 400).unwrap();
        let wide = measure_text_width("WWWW", 30.0, "No Such Family, sans-serif", 400).unwrap();
        assert!(narrow > 0.0);
        assert!(wide > narrow);
    }

    #[test]
    fn empty_family_list_defaults_to_sans() {
        let tokens = parse_family_list(" , ");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], FamilyToken::Generic(Family::SansSerif)));
    }

    #[test]
    fn face_keys_distinguish_weight() {
        assert_ne!(FaceKey::new("serif", 400).cache_stem(), FaceKey::new("serif", 700).cache_stem());
        assert_eq!(FaceKey::new("  ", 400).family, "sans-serif");
    }
}
