use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::admin::{AdminCatalogueList, AdminStats, AdminUserList, SetPlanRequest, ThemeStats},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Subscription,
    response::ApiResponse,
    routes::params::{AdminUserQuery, CatalogueQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/users", get(list_users))
        .route("/users/{id}/plan", patch(set_user_plan))
        .route("/catalogues", get(list_catalogues))
        .route("/catalogues/{id}", delete(delete_catalogue))
        .route("/themes/stats", get(theme_stats))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Platform totals", body = ApiResponse<AdminStats>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminStats>>> {
    let resp = admin_service::get_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(AdminUserQuery),
    responses(
        (status = 200, description = "Users with their plans", body = ApiResponse<AdminUserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminUserQuery>,
) -> AppResult<Json<ApiResponse<AdminUserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/plan",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetPlanRequest,
    responses(
        (status = 200, description = "Plan overridden", body = ApiResponse<Subscription>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_user_plan(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPlanRequest>,
) -> AppResult<Json<ApiResponse<Subscription>>> {
    let resp = admin_service::set_user_plan(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/catalogues",
    params(CatalogueQuery),
    responses(
        (status = 200, description = "All catalogues", body = ApiResponse<AdminCatalogueList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_catalogues(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<Json<ApiResponse<AdminCatalogueList>>> {
    let resp = admin_service::list_catalogues(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/catalogues/{id}",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Catalogue removed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_catalogue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let resp = admin_service::delete_catalogue(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/themes/stats",
    responses(
        (status = 200, description = "Selections per theme", body = ApiResponse<ThemeStats>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn theme_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ThemeStats>>> {
    let resp = admin_service::theme_stats(&state, &user).await?;
    Ok(Json(resp))
}
