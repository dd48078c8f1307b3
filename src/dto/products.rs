use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    domain::ordering::SortPosition,
    models::{PriceDisplay, Product},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "19.90")]
    pub price: Decimal,
    pub price_display: Option<PriceDisplay>,
    pub image_urls: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "19.90")]
    pub price: Option<Decimal>,
    pub price_display: Option<PriceDisplay>,
    pub image_urls: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
    /// Detach the product from its category.
    #[serde(default)]
    pub clear_category: bool,
}

/// Full `(id, sort_order)` list for every product in the catalogue.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderProductsRequest {
    pub products: Vec<SortPosition>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveProductRequest {
    pub product_id: Uuid,
    pub to_index: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
