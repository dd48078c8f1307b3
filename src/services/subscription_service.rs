use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
    sea_query::{LockType, OnConflict},
};
use uuid::Uuid;

use crate::{
    domain::plan::{PlanTier, SubscriptionStatus, effective_plan},
    entity::{CatalogueExports, Subscriptions, catalogue_exports, subscriptions},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Subscription,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Length of the export window when no billing period is known.
pub const FALLBACK_PERIOD_DAYS: i64 = 30;

/// Load the profile's subscription row, creating a free one if missing.
pub async fn ensure_subscription<C: ConnectionTrait>(
    conn: &C,
    profile_id: Uuid,
) -> AppResult<subscriptions::Model> {
    if let Some(existing) = find_for_profile(conn, profile_id).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let active = subscriptions::ActiveModel {
        id: Set(Uuid::new_v4()),
        profile_id: Set(profile_id),
        plan: Set(PlanTier::Free.as_str().to_string()),
        status: Set(SubscriptionStatus::Active.as_str().to_string()),
        current_period_start: Set(None),
        current_period_end: Set(None),
        cancel_at_period_end: Set(false),
        external_customer_id: Set(None),
        external_subscription_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Subscriptions::insert(active)
        .on_conflict(
            OnConflict::column(subscriptions::Column::ProfileId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    find_for_profile(conn, profile_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("subscription row missing after insert")))
}

pub async fn find_for_profile<C: ConnectionTrait>(
    conn: &C,
    profile_id: Uuid,
) -> AppResult<Option<subscriptions::Model>> {
    Ok(Subscriptions::find()
        .filter(subscriptions::Column::ProfileId.eq(profile_id))
        .one(conn)
        .await?)
}

/// Load the profile's subscription with a row lock. Quota checks run inside
/// the caller's transaction after this so that concurrent writes by the same
/// profile are counted one at a time.
pub async fn lock_for_profile<C: ConnectionTrait>(
    conn: &C,
    profile_id: Uuid,
) -> AppResult<subscriptions::Model> {
    ensure_subscription(conn, profile_id).await?;
    Subscriptions::find()
        .filter(subscriptions::Column::ProfileId.eq(profile_id))
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("subscription row missing after insert")))
}

/// Plan whose limits currently apply to the profile.
pub async fn current_plan<C: ConnectionTrait>(conn: &C, profile_id: Uuid) -> AppResult<PlanTier> {
    let sub = ensure_subscription(conn, profile_id).await?;
    Ok(plan_of(&sub))
}

pub fn plan_of(sub: &subscriptions::Model) -> PlanTier {
    let plan = sub.plan.parse().unwrap_or(PlanTier::Free);
    let status = sub.status.parse().unwrap_or(SubscriptionStatus::Incomplete);
    effective_plan(plan, status)
}

/// Start of the window export quotas are counted in.
pub fn period_start(sub: &subscriptions::Model, now: DateTime<Utc>) -> DateTime<Utc> {
    match sub.current_period_start {
        Some(start) if DateTime::<Utc>::from(start) <= now => start.into(),
        _ => now - Duration::days(FALLBACK_PERIOD_DAYS),
    }
}

pub async fn exports_since<C: ConnectionTrait>(
    conn: &C,
    profile_id: Uuid,
    since: DateTime<Utc>,
) -> AppResult<u64> {
    let count = CatalogueExports::find()
        .filter(catalogue_exports::Column::ProfileId.eq(profile_id))
        .filter(catalogue_exports::Column::CreatedAt.gte(since))
        .count(conn)
        .await?;
    Ok(count)
}

pub async fn get_subscription(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Subscription>> {
    let sub = ensure_subscription(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success(
        "Subscription",
        Subscription::from(sub),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(plan: &str, status: &str, start: Option<DateTime<Utc>>) -> subscriptions::Model {
        let now = Utc::now();
        subscriptions::Model {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            plan: plan.into(),
            status: status.into(),
            current_period_start: start.map(Into::into),
            current_period_end: None,
            cancel_at_period_end: false,
            external_customer_id: None,
            external_subscription_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn lapsed_paid_plans_fall_back_to_free() {
        assert_eq!(plan_of(&sub("yearly", "active", None)), PlanTier::Yearly);
        assert_eq!(plan_of(&sub("monthly", "trialing", None)), PlanTier::Monthly);
        assert_eq!(plan_of(&sub("monthly", "past_due", None)), PlanTier::Free);
        assert_eq!(plan_of(&sub("garbage", "active", None)), PlanTier::Free);
    }

    #[test]
    fn period_start_uses_billing_period_or_last_thirty_days() {
        let now = Utc::now();
        let start = now - Duration::days(3);
        assert_eq!(
            period_start(&sub("monthly", "active", Some(start)), now).timestamp(),
            start.timestamp()
        );

        let fallback = period_start(&sub("free", "active", None), now);
        assert_eq!(fallback, now - Duration::days(FALLBACK_PERIOD_DAYS));

        let future = now + Duration::days(1);
        let clamped = period_start(&sub("monthly", "active", Some(future)), now);
        assert_eq!(clamped, now - Duration::days(FALLBACK_PERIOD_DAYS));
    }
}
