use serde::{Deserialize, Serialize};

/// A gradient stop: offset in `[0, 1]` and a CSS color.
pub type Stop = (f32, String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub title_font_family: String,
    pub tagline_font_family: String,
    pub background_stops: Vec<Stop>,
    pub glow_colors: Vec<String>,
    pub card_shadow_color: String,
    pub card_fill_start: String,
    pub card_fill_end: String,
    pub title_color: String,
    pub title_shadow_color: String,
    pub tagline_color: String,
    pub stem_color: String,
    pub stem_outline_color: String,
    pub leaf_colors: [String; 2],
    pub leaf_vein_color: String,
    pub wrap_stops: Vec<Stop>,
    pub wrap_shadow_color: String,
    pub wrap_highlight_color: String,
    pub vignette_color: String,
    pub vignette_opacity: f32,
    pub watermark_color: String,
}

fn stops(list: &[(f32, &str)]) -> Vec<Stop> {
    list.iter().map(|(offset, color)| (*offset, color.to_string())).collect()
}

fn colors(list: &[&str]) -> Vec<String> {
    list.iter().map(|color| color.to_string()).collect()
}

impl Theme {
    /// Night-sky card with warm pink glows.
    pub fn valentine() -> Self {
        Self {
            title_font_family: "ui-serif, Georgia, \"Times New Roman\", Times, serif".to_string(),
            tagline_font_family:
                "ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif"
                    .to_string(),
            background_stops: stops(&[(0.0, "#1a0b2e"), (0.45, "#2b124c"), (1.0, "#0b1026")]),
            glow_colors: colors(&["#ff4d6d", "#c77dff", "#ffe066", "#ffd6e0", "#9d4edd"]),
            card_shadow_color: "#000000".to_string(),
            card_fill_start: "rgba(255,255,255,0.10)".to_string(),
            card_fill_end: "rgba(255,255,255,0.04)".to_string(),
            title_color: "rgba(255,255,255,0.92)".to_string(),
            title_shadow_color: "rgba(255,117,143,0.45)".to_string(),
            tagline_color: "rgba(255,255,255,0.65)".to_string(),
            stem_color: "rgba(122,199,126,0.85)".to_string(),
            stem_outline_color: "rgba(56,154,98,0.9)".to_string(),
            leaf_colors: [
                "rgba(112,218,158,0.85)".to_string(),
                "rgba(82,196,130,0.85)".to_string(),
            ],
            leaf_vein_color: "#000000".to_string(),
            wrap_stops: stops(&[(0.0, "#ff4d6d"), (0.5, "#ff8fab"), (1.0, "#c77dff")]),
            wrap_shadow_color: "#000000".to_string(),
            wrap_highlight_color: "rgba(255,255,255,0.22)".to_string(),
            vignette_color: "#000000".to_string(),
            vignette_opacity: 0.55,
            watermark_color: "rgba(255,255,255,0.45)".to_string(),
        }
    }

    /// Pale paper card for printing; same flowers, lighter ground.
    pub fn daylight() -> Self {
        Self {
            background_stops: stops(&[(0.0, "#fff1f3"), (0.45, "#ffe4ec"), (1.0, "#f3e8ff")]),
            glow_colors: colors(&["#ffb3c1", "#e0aaff", "#fff3bf", "#ffd6e0", "#cdb4db"]),
            card_shadow_color: "#5a189a".to_string(),
            card_fill_start: "rgba(255,255,255,0.55)".to_string(),
            card_fill_end: "rgba(255,255,255,0.25)".to_string(),
            title_color: "rgba(60,9,108,0.92)".to_string(),
            title_shadow_color: "rgba(255,117,143,0.35)".to_string(),
            tagline_color: "rgba(60,9,108,0.65)".to_string(),
            vignette_color: "#5a189a".to_string(),
            vignette_opacity: 0.18,
            watermark_color: "rgba(60,9,108,0.45)".to_string(),
            ..Self::valentine()
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "valentine" | "default" | "night" => Some(Self::valentine()),
            "daylight" | "light" => Some(Self::daylight()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::valentine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_by_name() {
        assert!(Theme::from_name("Valentine").is_some());
        assert_eq!(
            Theme::from_name(" light ").map(|t| t.vignette_opacity),
            Some(Theme::daylight().vignette_opacity)
        );
        assert!(Theme::from_name("neon").is_none());
    }

    #[test]
    fn daylight_keeps_plant_colors() {
        let night = Theme::valentine();
        let day = Theme::daylight();
        assert_eq!(night.stem_color, day.stem_color);
        assert_eq!(night.leaf_colors, day.leaf_colors);
        assert_ne!(night.background_stops, day.background_stops);
    }
}
