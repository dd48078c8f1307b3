use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::products::{
        CreateProductRequest, MoveProductRequest, ProductList, ProductListQuery,
        ReorderProductsRequest, UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/products", get(list_products).post(create_product))
        .route("/{id}/products/reorder", patch(reorder_products))
        .route("/{id}/products/move", post(move_product))
        .route(
            "/{id}/products/{product_id}",
            put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/catalogues/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Catalogue ID"),
        ProductListQuery
    ),
    responses(
        (status = 200, description = "Products in sort order", body = ApiResponse<ProductList>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, &user, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalogues/{id}/products",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product at the end of the catalogue", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/catalogues/{id}/products/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Catalogue ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/catalogues/{id}/products/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Catalogue ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product; later positions shift down"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let resp = product_service::delete_product(&state, &user, id, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/catalogues/{id}/products/reorder",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body = ReorderProductsRequest,
    responses(
        (status = 200, description = "Products in their new order", body = ApiResponse<ProductList>),
        (status = 400, description = "Ordering must list every product once with positions 0..n"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn reorder_products(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderProductsRequest>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::reorder_products(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalogues/{id}/products/move",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body = MoveProductRequest,
    responses(
        (status = 200, description = "Products in their new order", body = ApiResponse<ProductList>),
        (status = 400, description = "Target index out of range"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn move_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveProductRequest>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::move_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
