use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    domain::settings::{merge_settings, resolve_style, validate_patch},
    dto::catalogues::{SettingsResponse, StyleResponse},
    entity::catalogues,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::access::{load_catalogue_for, require_edit},
    state::AppState,
};

pub async fn get_settings(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<ApiResponse<SettingsResponse>> {
    let access = load_catalogue_for(&state.orm, user, catalogue_id).await?;
    let data = SettingsResponse {
        settings: access.catalogue.settings,
    };
    Ok(ApiResponse::success("Settings", data, None))
}

/// Shallow-merge `patch` into the stored settings. Top-level keys in the
/// patch replace stored ones wholesale; other keys are kept.
pub async fn patch_settings(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    patch: Value,
) -> AppResult<ApiResponse<SettingsResponse>> {
    let patch_map = validate_patch(&patch)?;
    let access = require_edit(&state.orm, user, catalogue_id).await?;

    let merged = merge_settings(&access.catalogue.settings, patch_map);
    let keys: Vec<&String> = patch_map.keys().collect();

    let mut active: catalogues::ActiveModel = access.catalogue.into();
    active.settings = Set(merged);
    active.updated_at = Set(Utc::now().into());
    let catalogue = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "catalogue_settings_update",
        "catalogues",
        serde_json::json!({ "catalogue_id": catalogue.id, "keys": keys }),
    )
    .await;

    Ok(ApiResponse::success(
        "Settings updated",
        SettingsResponse {
            settings: catalogue.settings,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_style(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<ApiResponse<StyleResponse>> {
    let access = load_catalogue_for(&state.orm, user, catalogue_id).await?;
    let data = StyleResponse {
        style: resolve_style(&access.catalogue.settings),
        theme: access.catalogue.theme,
    };
    Ok(ApiResponse::success("Style", data, None))
}
