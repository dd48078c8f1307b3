use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    domain::plan::PlanTier,
    dto::themes::{SelectThemeRequest, ThemeList, ThemeSelection, ThemeView},
    entity::{catalogues, theme_selections},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::{
        access::require_edit, catalogue_service::resolve_theme,
        subscription_service::current_plan,
    },
    state::AppState,
    themes,
};

pub fn theme_views(plan: PlanTier) -> Vec<ThemeView> {
    themes::all()
        .iter()
        .map(|theme| ThemeView {
            id: theme.id.to_string(),
            name: theme.name.to_string(),
            description: theme.description.to_string(),
            premium: theme.premium,
            available: !theme.premium || plan.limits().premium_themes,
        })
        .collect()
}

/// Anonymous callers see availability for the free plan.
pub async fn list_themes(
    state: &AppState,
    user: Option<&AuthUser>,
) -> AppResult<ApiResponse<ThemeList>> {
    let plan = match user {
        Some(user) => current_plan(&state.orm, user.user_id).await?,
        None => PlanTier::Free,
    };
    Ok(ApiResponse::success(
        "Themes",
        ThemeList {
            items: theme_views(plan),
        },
        None,
    ))
}

/// Record a theme selection and, when a catalogue is given, apply it. The
/// catalogue owner's plan decides access to premium themes.
pub async fn select_theme(
    state: &AppState,
    user: &AuthUser,
    theme_id: &str,
    payload: SelectThemeRequest,
) -> AppResult<ApiResponse<ThemeSelection>> {
    let access = match payload.catalogue_id {
        Some(catalogue_id) => Some(require_edit(&state.orm, user, catalogue_id).await?),
        None => None,
    };
    let payer = access
        .as_ref()
        .map(|a| a.catalogue.owner_id)
        .unwrap_or(user.user_id);
    let theme = resolve_theme(theme_id, current_plan(&state.orm, payer).await?)?;

    let now = Utc::now();
    let txn = state.orm.begin().await?;
    theme_selections::ActiveModel {
        id: Set(Uuid::new_v4()),
        profile_id: Set(user.user_id),
        theme_id: Set(theme.id.to_string()),
        catalogue_id: Set(payload.catalogue_id),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let applied = match access {
        Some(access) => {
            let mut active: catalogues::ActiveModel = access.catalogue.into();
            active.theme = Set(theme.id.to_string());
            active.updated_at = Set(now.into());
            active.update(&txn).await?;
            true
        }
        None => false,
    };
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "theme_select",
        "theme_selections",
        serde_json::json!({ "theme_id": theme.id, "catalogue_id": payload.catalogue_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Theme selected",
        ThemeSelection {
            theme_id: theme.id.to_string(),
            catalogue_id: payload.catalogue_id,
            applied,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_themes_are_locked_on_free() {
        let views = theme_views(PlanTier::Free);
        assert_eq!(views.len(), themes::all().len());
        assert!(views.iter().all(|v| v.available != v.premium));

        assert!(theme_views(PlanTier::Yearly).iter().all(|v| v.available));
    }
}
