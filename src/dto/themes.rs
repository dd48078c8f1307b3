use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub premium: bool,
    /// Whether the caller's plan unlocks this theme. Anonymous callers only get free themes.
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeList {
    pub items: Vec<ThemeView>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SelectThemeRequest {
    pub catalogue_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeSelection {
    pub theme_id: String,
    pub catalogue_id: Option<Uuid>,
    pub applied: bool,
}
