use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    domain::layout::PrintLayout,
    dto::catalogues::{
        CatalogueDetail, CatalogueList, CreateCatalogueRequest, DuplicateCatalogueRequest,
        SettingsResponse, StyleResponse, UpdateCatalogueRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Catalogue,
    response::ApiResponse,
    routes::params::CatalogueQuery,
    services::{catalogue_service, export_service, settings_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_catalogues).post(create_catalogue))
        .route(
            "/{id}",
            get(get_catalogue).put(update_catalogue).delete(delete_catalogue),
        )
        .route("/{id}/duplicate", post(duplicate_catalogue))
        .route("/{id}/settings", get(get_settings).patch(patch_settings))
        .route("/{id}/style", get(get_style))
        .route("/{id}/export", post(export_catalogue))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/catalogues/{id}", get(get_public_catalogue))
}

#[utoipa::path(
    get,
    path = "/api/catalogues",
    params(CatalogueQuery),
    responses(
        (status = 200, description = "Catalogues owned by or shared with the caller", body = ApiResponse<CatalogueList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn list_catalogues(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<Json<ApiResponse<CatalogueList>>> {
    let resp = catalogue_service::list_catalogues(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalogues",
    request_body = CreateCatalogueRequest,
    responses(
        (status = 201, description = "Create catalogue", body = ApiResponse<Catalogue>),
        (status = 400, description = "Invalid catalogue"),
        (status = 402, description = "Plan limit reached")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn create_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCatalogueRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Catalogue>>)> {
    let resp = catalogue_service::create_catalogue(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/catalogues/{id}",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Catalogue with categories and ordered products", body = ApiResponse<CatalogueDetail>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn get_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CatalogueDetail>>> {
    let resp = catalogue_service::get_catalogue(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/public/catalogues/{id}",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Public catalogue", body = ApiResponse<CatalogueDetail>),
        (status = 404, description = "Not Found")
    ),
    tag = "Catalogues"
)]
pub async fn get_public_catalogue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CatalogueDetail>>> {
    let resp = catalogue_service::get_public_catalogue(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/catalogues/{id}",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body = UpdateCatalogueRequest,
    responses(
        (status = 200, description = "Updated catalogue", body = ApiResponse<Catalogue>),
        (status = 402, description = "Theme requires a paid plan"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn update_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCatalogueRequest>,
) -> AppResult<Json<ApiResponse<Catalogue>>> {
    let resp = catalogue_service::update_catalogue(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/catalogues/{id}",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Deleted catalogue"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn delete_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let resp = catalogue_service::delete_catalogue(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalogues/{id}/duplicate",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body = DuplicateCatalogueRequest,
    responses(
        (status = 201, description = "Duplicated catalogue", body = ApiResponse<Catalogue>),
        (status = 402, description = "Plan limit reached"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn duplicate_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<DuplicateCatalogueRequest>>,
) -> AppResult<(StatusCode, Json<ApiResponse<Catalogue>>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = catalogue_service::duplicate_catalogue(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/catalogues/{id}/settings",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Stored settings blob", body = ApiResponse<SettingsResponse>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SettingsResponse>>> {
    let resp = settings_service::get_settings(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/catalogues/{id}/settings",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body(content = Object, description = "Top-level keys replace the stored ones"),
    responses(
        (status = 200, description = "Merged settings", body = ApiResponse<SettingsResponse>),
        (status = 400, description = "Patch is not an object or a section is malformed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn patch_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> AppResult<Json<ApiResponse<SettingsResponse>>> {
    let resp = settings_service::patch_settings(&state, &user, id, patch).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalogues/{id}/style",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Resolved style with defaults", body = ApiResponse<StyleResponse>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_style(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StyleResponse>>> {
    let resp = settings_service::get_style(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalogues/{id}/export",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Print layout for PDF rendering", body = ApiResponse<PrintLayout>),
        (status = 402, description = "Export not available on the current plan"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogues"
)]
pub async fn export_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PrintLayout>>> {
    let resp = export_service::export_catalogue(&state, &user, id).await?;
    Ok(Json(resp))
}
