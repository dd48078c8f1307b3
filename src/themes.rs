use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_THEME: &str = "classic";

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub premium: bool,
}

const THEMES: &[Theme] = &[
    Theme {
        id: "classic",
        name: "Classic",
        description: "Two-column grid with a serif title page",
        premium: false,
    },
    Theme {
        id: "modern",
        name: "Modern",
        description: "Large imagery and bold sans-serif headings",
        premium: false,
    },
    Theme {
        id: "minimal",
        name: "Minimal",
        description: "Generous whitespace and a single accent colour",
        premium: false,
    },
    Theme {
        id: "elegant",
        name: "Elegant",
        description: "Muted palette with thin rules and italic captions",
        premium: true,
    },
    Theme {
        id: "bold",
        name: "Bold",
        description: "Full-bleed colour blocks for promotional catalogues",
        premium: true,
    },
    Theme {
        id: "boutique",
        name: "Boutique",
        description: "Magazine layout with featured products per category",
        premium: true,
    },
];

pub fn all() -> &'static [Theme] {
    THEMES
}

pub fn find(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_free() {
        let theme = find(DEFAULT_THEME).expect("default theme registered");
        assert!(!theme.premium);
    }

    #[test]
    fn theme_ids_are_unique() {
        let mut ids: Vec<&str> = all().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
        assert!(find("does-not-exist").is_none());
    }
}
