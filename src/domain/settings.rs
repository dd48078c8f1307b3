//! Catalogue customisation settings.
//!
//! Settings live in one JSON object per catalogue. The style sections below
//! have typed shapes with defaults; any other top-level key (branding,
//! contact, ...) is stored as sent.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

pub const COLORS_KEY: &str = "colors";
pub const FONTS_KEY: &str = "fonts";
pub const SPACING_KEY: &str = "spacing";
pub const ADVANCED_KEY: &str = "advanced";
pub const LAYOUT_KEY: &str = "layout";
pub const CONTACT_KEY: &str = "contact";
pub const BRANDING_KEY: &str = "branding";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings patch must be a JSON object")]
    NotAnObject,
    #[error("invalid '{section}' settings: {reason}")]
    InvalidSection { section: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ColorCustomization {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub page_background: String,
    pub card_background: String,
    pub heading_text: String,
    pub body_text: String,
    pub price_text: String,
    pub category_badge: String,
}

impl Default for ColorCustomization {
    fn default() -> Self {
        Self {
            primary: "#1f2937".into(),
            secondary: "#6b7280".into(),
            accent: "#f59e0b".into(),
            page_background: "#ffffff".into(),
            card_background: "#f9fafb".into(),
            heading_text: "#111827".into(),
            body_text: "#374151".into(),
            price_text: "#059669".into(),
            category_badge: "#e5e7eb".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FontStyle {
    pub family: String,
    pub size: u16,
    pub weight: u16,
}

impl FontStyle {
    fn new(family: &str, size: u16, weight: u16) -> Self {
        Self {
            family: family.to_string(),
            size,
            weight,
        }
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self::new("Inter", 14, 400)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FontCustomization {
    pub title: FontStyle,
    pub heading: FontStyle,
    pub product_name: FontStyle,
    pub body: FontStyle,
    pub price: FontStyle,
}

impl Default for FontCustomization {
    fn default() -> Self {
        Self {
            title: FontStyle::new("Playfair Display", 36, 700),
            heading: FontStyle::new("Inter", 22, 600),
            product_name: FontStyle::new("Inter", 16, 600),
            body: FontStyle::new("Inter", 13, 400),
            price: FontStyle::new("Inter", 16, 700),
        }
    }
}

/// Pixel values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SpacingCustomization {
    pub page_padding: u16,
    pub section_margin: u16,
    pub product_gap: u16,
    pub card_padding: u16,
}

impl Default for SpacingCustomization {
    fn default() -> Self {
        Self {
            page_padding: 32,
            section_margin: 24,
            product_gap: 16,
            card_padding: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AdvancedStyleCustomization {
    pub border_width: u16,
    pub border_radius: u16,
    pub border_color: String,
    pub border_style: BorderStyle,
    pub shadow_enabled: bool,
    pub shadow_blur: u16,
    pub shadow_offset_x: i16,
    pub shadow_offset_y: i16,
    pub shadow_color: String,
}

impl Default for AdvancedStyleCustomization {
    fn default() -> Self {
        Self {
            border_width: 1,
            border_radius: 8,
            border_color: "#e5e7eb".into(),
            border_style: BorderStyle::Solid,
            shadow_enabled: true,
            shadow_blur: 6,
            shadow_offset_x: 0,
            shadow_offset_y: 2,
            shadow_color: "rgba(0, 0, 0, 0.08)".into(),
        }
    }
}

pub const MIN_PRODUCTS_PER_PAGE: u32 = 1;
pub const MAX_PRODUCTS_PER_PAGE: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LayoutSettings {
    pub products_per_page: u32,
    pub show_cover: bool,
    pub show_intro: bool,
    pub show_back_cover: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            products_per_page: 6,
            show_cover: true,
            show_intro: true,
            show_back_cover: true,
        }
    }
}

impl LayoutSettings {
    pub fn products_per_page(&self) -> usize {
        self.products_per_page
            .clamp(MIN_PRODUCTS_PER_PAGE, MAX_PRODUCTS_PER_PAGE) as usize
    }
}

/// Fully resolved style used by preview and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogueStyle {
    pub colors: ColorCustomization,
    pub fonts: FontCustomization,
    pub spacing: SpacingCustomization,
    pub advanced: AdvancedStyleCustomization,
    pub layout: LayoutSettings,
}

/// Shallow merge: every top-level key in `patch` replaces the stored value,
/// all other stored keys are kept. A non-object `existing` counts as `{}`.
pub fn merge_settings(existing: &Value, patch: &Map<String, Value>) -> Value {
    let mut merged = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

/// Check that the typed sections of a patch have the expected shape.
pub fn validate_patch(patch: &Value) -> Result<&Map<String, Value>, SettingsError> {
    let map = patch.as_object().ok_or(SettingsError::NotAnObject)?;
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            COLORS_KEY => check_section::<ColorCustomization>(key, value)?,
            FONTS_KEY => check_section::<FontCustomization>(key, value)?,
            SPACING_KEY => check_section::<SpacingCustomization>(key, value)?,
            ADVANCED_KEY => check_section::<AdvancedStyleCustomization>(key, value)?,
            LAYOUT_KEY => check_section::<LayoutSettings>(key, value)?,
            _ => {}
        }
    }
    Ok(map)
}

fn check_section<T: DeserializeOwned>(key: &str, value: &Value) -> Result<(), SettingsError> {
    serde_json::from_value::<T>(value.clone())
        .map(|_| ())
        .map_err(|err| SettingsError::InvalidSection {
            section: key.to_string(),
            reason: err.to_string(),
        })
}

/// Resolve the typed style from a stored settings blob, filling defaults for
/// anything missing or unreadable.
pub fn resolve_style(settings: &Value) -> CatalogueStyle {
    CatalogueStyle {
        colors: section(settings, COLORS_KEY),
        fonts: section(settings, FONTS_KEY),
        spacing: section(settings, SPACING_KEY),
        advanced: section(settings, ADVANCED_KEY),
        layout: section(settings, LAYOUT_KEY),
    }
}

fn section<T: DeserializeOwned + Default>(settings: &Value, key: &str) -> T {
    settings
        .get(key)
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_replaces_only_sent_keys() {
        let stored = json!({
            "colors": { "primary": "#000000" },
            "fonts": { "body": { "size": 12 } },
            "contact": { "email": "shop@example.com" }
        });
        let patch = json!({ "colors": { "primary": "#ff0000", "accent": "#00ff00" } });

        let merged = merge_settings(&stored, patch.as_object().unwrap());

        assert_eq!(merged["colors"], json!({ "primary": "#ff0000", "accent": "#00ff00" }));
        assert_eq!(merged["fonts"], stored["fonts"]);
        assert_eq!(merged["contact"], stored["contact"]);
    }

    #[test]
    fn merge_into_non_object_starts_empty() {
        let patch = json!({ "layout": { "products_per_page": 4 } });
        let merged = merge_settings(&Value::Null, patch.as_object().unwrap());
        assert_eq!(merged, patch);
    }

    #[test]
    fn merge_keeps_explicit_null() {
        let stored = json!({ "branding": { "logo": "a.png" } });
        let patch = json!({ "branding": null });
        let merged = merge_settings(&stored, patch.as_object().unwrap());
        assert_eq!(merged, json!({ "branding": null }));
    }

    #[test]
    fn validate_patch_rejects_bad_sections() {
        assert_eq!(validate_patch(&json!([1, 2])), Err(SettingsError::NotAnObject));

        let bad = json!({ "spacing": { "page_padding": "wide" } });
        match validate_patch(&bad) {
            Err(SettingsError::InvalidSection { section, .. }) => assert_eq!(section, "spacing"),
            other => panic!("unexpected result: {other:?}"),
        }

        let bad_border = json!({ "advanced": { "border_style": "wavy" } });
        assert!(validate_patch(&bad_border).is_err());
    }

    #[test]
    fn validate_patch_passes_unknown_and_partial_sections() {
        let patch = json!({
            "colors": { "primary": "#123456" },
            "branding": { "anything": [1, 2, 3] },
            "fonts": null
        });
        assert!(validate_patch(&patch).is_ok());
    }

    #[test]
    fn resolve_style_fills_defaults() {
        let settings = json!({
            "colors": { "accent": "#abcdef" },
            "spacing": "garbage",
            "layout": { "products_per_page": 100 }
        });
        let style = resolve_style(&settings);

        assert_eq!(style.colors.accent, "#abcdef");
        assert_eq!(style.colors.primary, ColorCustomization::default().primary);
        assert_eq!(style.spacing, SpacingCustomization::default());
        assert_eq!(style.fonts, FontCustomization::default());
        assert_eq!(style.layout.products_per_page(), MAX_PRODUCTS_PER_PAGE as usize);
    }

    #[test]
    fn resolve_style_of_empty_blob_is_default() {
        assert_eq!(resolve_style(&json!({})), CatalogueStyle::default());
    }
}
