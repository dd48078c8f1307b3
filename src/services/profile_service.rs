use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

use crate::{
    audit,
    dto::profile::{ProfileWithSubscription, UpdateProfileRequest},
    entity::{Profiles, profiles},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Profile, Subscription},
    response::{ApiResponse, Meta},
    services::subscription_service::ensure_subscription,
    state::AppState,
};

async fn load_profile(state: &AppState, user: &AuthUser) -> AppResult<profiles::Model> {
    Profiles::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProfileWithSubscription>> {
    let profile = load_profile(state, user).await?;
    let subscription = ensure_subscription(&state.orm, user.user_id).await?;

    let data = ProfileWithSubscription {
        profile: Profile::from_entity(profile, user.email.clone()),
        subscription: Subscription::from(subscription),
    };
    Ok(ApiResponse::success("Profile", data, Some(Meta::empty())))
}

fn apply(field: Option<String>) -> Option<Option<String>> {
    field.map(|value| {
        let value = value.trim().to_string();
        if value.is_empty() { None } else { Some(value) }
    })
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let existing = load_profile(state, user).await?;
    let mut active: profiles::ActiveModel = existing.into();

    if let Some(v) = apply(payload.full_name) {
        active.full_name = Set(v);
    }
    if let Some(v) = apply(payload.company_name) {
        active.company_name = Set(v);
    }
    if let Some(v) = apply(payload.phone) {
        active.phone = Set(v);
    }
    if let Some(v) = apply(payload.website) {
        active.website = Set(v);
    }
    if let Some(v) = apply(payload.address) {
        active.address = Set(v);
    }
    if let Some(v) = apply(payload.logo_url) {
        active.logo_url = Set(v);
    }
    active.updated_at = Set(Utc::now().into());

    let profile = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "profile_update",
        "profiles",
        serde_json::json!({ "profile_id": profile.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        Profile::from_entity(profile, user.email.clone()),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::apply;

    #[test]
    fn blank_values_clear_and_missing_values_keep() {
        assert_eq!(apply(None), None);
        assert_eq!(apply(Some("  ".into())), Some(None));
        assert_eq!(apply(Some(" Acme ".into())), Some(Some("Acme".into())));
    }
}
