//! Explicit configuration structs. Nothing here is global: callers pass
//! an `ExportConfig` to the exporter and an `ElementDefaults` to the scene.

use crate::model::{Position, StyleOverrides};
use serde::{Deserialize, Serialize};

// ─── Fonts ───────────────────────────────────────────────────────────────

/// Loads every selectable font, so switching fonts never changes the `<head>`.
pub const FONT_STYLESHEET: &str =
    "https://fonts.googleapis.com/css2?family=Alegreya:wght@400;700&family=Belleza&display=swap";

/// Site-wide body font of the exported page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Alegreya,
    Belleza,
}

impl FontChoice {
    /// Value of the `font-family` declaration.
    pub fn css_family(self) -> &'static str {
        match self {
            FontChoice::Alegreya => "'Alegreya', serif",
            FontChoice::Belleza => "'Belleza', sans-serif",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "alegreya" | "serif" => Some(FontChoice::Alegreya),
            "belleza" | "sans" | "sans-serif" => Some(FontChoice::Belleza),
            _ => None,
        }
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

/// Configuration for `export_static_document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Document `<title>`. Default: **Exported Website**.
    pub title: String,
    /// `<html lang>`. Default: **en**.
    pub lang: String,
    pub font: FontChoice,
    /// Suggested download file name. Default: **website.html**.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "Exported Website".to_string(),
            lang: "en".to_string(),
            font: FontChoice::default(),
            file_name: "website.html".to_string(),
        }
    }
}

// ─── Element defaults ────────────────────────────────────────────────────

/// Initial content and placement of newly added basic elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementDefaults {
    pub heading_text: String,
    pub paragraph_text: String,
    pub image_url: String,
    pub image_width: String,
    pub image_height: String,
    pub position: Position,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        Self {
            heading_text: "Headline Text".to_string(),
            paragraph_text: "This is a paragraph. You can edit this text.".to_string(),
            image_url: "https://placehold.co/600x400.png".to_string(),
            image_width: "300px".to_string(),
            image_height: "200px".to_string(),
            position: Position::new(50.0, 50.0),
        }
    }
}

impl ElementDefaults {
    /// Starting style overrides for a new image.
    pub fn image_styles(&self) -> StyleOverrides {
        [
            ("width", self.image_width.as_str()),
            ("height", self.image_height.as_str()),
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_config_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.title, "Exported Website");
        assert_eq!(config.file_name, "website.html");
        assert_eq!(config.font, FontChoice::Alegreya);
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{"font":"belleza"}"#).unwrap();
        assert_eq!(config.font, FontChoice::Belleza);
        assert_eq!(config.lang, "en");
        assert_eq!(config.font.css_family(), "'Belleza', sans-serif");
    }

    #[test]
    fn font_parse_accepts_aliases() {
        assert_eq!(FontChoice::parse("Serif"), Some(FontChoice::Alegreya));
        assert_eq!(FontChoice::parse("sans"), Some(FontChoice::Belleza));
        assert_eq!(FontChoice::parse("comic"), None);
    }
}
