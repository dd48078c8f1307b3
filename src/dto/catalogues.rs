use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    domain::settings::CatalogueStyle,
    models::{Catalogue, Category, Product},
    services::access::AccessLevel,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCatalogueRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub theme: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<Value>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCatalogueRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub theme: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DuplicateCatalogueRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogueSummary {
    #[serde(flatten)]
    pub catalogue: Catalogue,
    pub access: AccessLevel,
    pub product_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogueList {
    pub items: Vec<CatalogueSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogueDetail {
    pub catalogue: Catalogue,
    pub access: AccessLevel,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    #[schema(value_type = Object)]
    pub settings: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StyleResponse {
    pub theme: String,
    pub style: CatalogueStyle,
}
