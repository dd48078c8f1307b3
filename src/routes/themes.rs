use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::themes::{SelectThemeRequest, ThemeList, ThemeSelection},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::theme_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_themes))
        .route("/{theme_id}/select", post(select_theme))
}

#[utoipa::path(
    get,
    path = "/api/themes",
    responses(
        (status = 200, description = "Theme registry with availability for the caller's plan", body = ApiResponse<ThemeList>)
    ),
    security((), ("bearer_auth" = [])),
    tag = "Themes"
)]
pub async fn list_themes(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Json<ApiResponse<ThemeList>>> {
    let resp = theme_service::list_themes(&state, user.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/themes/{theme_id}/select",
    params(("theme_id" = String, Path, description = "Theme ID")),
    request_body = SelectThemeRequest,
    responses(
        (status = 200, description = "Theme selected", body = ApiResponse<ThemeSelection>),
        (status = 400, description = "Unknown theme"),
        (status = 402, description = "Theme requires a paid plan"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Themes"
)]
pub async fn select_theme(
    State(state): State<AppState>,
    user: AuthUser,
    Path(theme_id): Path<String>,
    payload: Option<Json<SelectThemeRequest>>,
) -> AppResult<Json<ApiResponse<ThemeSelection>>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = theme_service::select_theme(&state, &user, &theme_id, payload).await?;
    Ok(Json(resp))
}
