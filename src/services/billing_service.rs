use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit,
    billing::{
        CheckoutRequestParams,
        coupon::apply_discount,
        webhook::{CheckoutCompleted, SubscriptionSnapshot, WebhookEvent},
    },
    domain::plan::{PlanTier, SubscriptionStatus},
    dto::billing::{
        CheckoutRequest, CouponValidation, HostedRedirect, ValidateCouponRequest, WebhookAck,
    },
    entity::{Profiles, Subscriptions, subscriptions},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::subscription_service::{ensure_subscription, find_for_profile},
    state::AppState,
};

pub async fn create_checkout_session(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<HostedRedirect>> {
    if !payload.plan.is_paid() {
        return Err(AppError::BadRequest("Choose a paid plan to check out".into()));
    }

    let promotion = match payload.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Some(
            state
                .billing
                .accept_code(code)
                .await?
                .ok_or_else(|| AppError::BadRequest("Invalid coupon code".into()))?,
        ),
        _ => None,
    };

    let sub = ensure_subscription(&state.orm, user.user_id).await?;
    let base = &state.config.app_base_url;
    let success_url = format!("{base}/billing/success?session_id={{CHECKOUT_SESSION_ID}}");
    let cancel_url = format!("{base}/pricing");

    let session = state
        .billing
        .checkout(
            payload.plan,
            CheckoutRequestParams {
                profile_id: user.user_id,
                customer_id: sub.external_customer_id.as_deref(),
                customer_email: &user.email,
                promotion_code_id: promotion.as_ref().map(|p| p.promotion_code_id.as_str()),
                success_url: &success_url,
                cancel_url: &cancel_url,
            },
        )
        .await?;
    let url = session
        .url
        .ok_or_else(|| AppError::PaymentGateway("checkout session has no url".into()))?;

    audit::record(
        &state.orm,
        user.user_id,
        "checkout_session_create",
        "subscriptions",
        serde_json::json!({ "plan": payload.plan, "session_id": session.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout session created",
        HostedRedirect { url },
        Some(Meta::empty()),
    ))
}

pub async fn create_portal_session(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<HostedRedirect>> {
    let sub = ensure_subscription(&state.orm, user.user_id).await?;
    let customer_id = sub
        .external_customer_id
        .ok_or_else(|| AppError::BadRequest("No billing account found".into()))?;

    let return_url = format!("{}/billing", state.config.app_base_url);
    let session = state.billing.portal(&customer_id, &return_url).await?;
    let url = session
        .url
        .ok_or_else(|| AppError::PaymentGateway("portal session has no url".into()))?;

    Ok(ApiResponse::success(
        "Portal session created",
        HostedRedirect { url },
        Some(Meta::empty()),
    ))
}

/// Price a plan with a coupon. Codes the processor does not accept leave
/// the price unchanged.
pub async fn validate_coupon(
    state: &AppState,
    payload: ValidateCouponRequest,
) -> AppResult<ApiResponse<CouponValidation>> {
    let original_price = payload.plan.price();
    let code = payload.code.trim().to_string();

    let accepted = if payload.plan.is_paid() {
        state.billing.accept_code(&code).await?
    } else {
        None
    };

    let data = match accepted {
        Some(accepted) => CouponValidation {
            final_price: apply_discount(original_price, &accepted.discount),
            discount: Some(accepted.discount),
            valid: true,
            original_price,
            code,
        },
        None => CouponValidation {
            final_price: original_price,
            discount: None,
            valid: false,
            original_price,
            code,
        },
    };
    Ok(ApiResponse::success("Coupon", data, Some(Meta::empty())))
}

/// Verify and apply a payment processor webhook.
pub async fn handle_webhook(
    state: &AppState,
    payload: &[u8],
    signature: Option<&str>,
) -> AppResult<ApiResponse<WebhookAck>> {
    let signature =
        signature.ok_or_else(|| AppError::BadRequest("Missing webhook signature".into()))?;
    let event = state
        .billing
        .receive_webhook(payload, signature, Utc::now().timestamp())?;

    let name = match event {
        WebhookEvent::CheckoutCompleted(completed) => {
            apply_checkout(state, completed).await?;
            "checkout.session.completed".to_string()
        }
        WebhookEvent::SubscriptionChanged(snapshot) => {
            apply_snapshot(state, snapshot, false).await?;
            "customer.subscription.updated".to_string()
        }
        WebhookEvent::SubscriptionDeleted(snapshot) => {
            apply_snapshot(state, snapshot, true).await?;
            "customer.subscription.deleted".to_string()
        }
        WebhookEvent::Ignored(kind) => {
            tracing::debug!(event = %kind, "webhook ignored");
            kind
        }
    };

    Ok(ApiResponse::success(
        "Webhook received",
        WebhookAck {
            received: true,
            event: name,
        },
        Some(Meta::empty()),
    ))
}

async fn apply_checkout(state: &AppState, completed: CheckoutCompleted) -> AppResult<()> {
    if Profiles::find_by_id(completed.profile_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        tracing::warn!(profile_id = %completed.profile_id, "checkout completed for unknown profile");
        return Ok(());
    }

    let sub = ensure_subscription(&state.orm, completed.profile_id).await?;
    let mut active: subscriptions::ActiveModel = sub.into();
    if let Some(customer) = completed.customer_id {
        active.external_customer_id = Set(Some(customer));
    }
    if let Some(subscription) = completed.subscription_id {
        active.external_subscription_id = Set(Some(subscription));
    }
    if let Some(plan) = completed.plan.filter(PlanTier::is_paid) {
        active.plan = Set(plan.as_str().to_string());
        active.status = Set(SubscriptionStatus::Active.as_str().to_string());
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(profile_id = %updated.profile_id, plan = %updated.plan, "checkout completed");
    audit::record(
        &state.orm,
        updated.profile_id,
        "subscription_checkout_completed",
        "subscriptions",
        serde_json::json!({ "plan": updated.plan }),
    )
    .await;
    Ok(())
}

async fn find_for_snapshot(
    state: &AppState,
    snapshot: &SubscriptionSnapshot,
) -> AppResult<Option<subscriptions::Model>> {
    let by_external = Subscriptions::find()
        .filter(subscriptions::Column::ExternalSubscriptionId.eq(snapshot.subscription_id.as_str()))
        .one(&state.orm)
        .await?;
    if by_external.is_some() {
        return Ok(by_external);
    }
    if let Some(profile_id) = snapshot.profile_id {
        if let Some(found) = find_for_profile(&state.orm, profile_id).await? {
            return Ok(Some(found));
        }
    }
    match &snapshot.customer_id {
        Some(customer) => Ok(Subscriptions::find()
            .filter(subscriptions::Column::ExternalCustomerId.eq(customer.as_str()))
            .one(&state.orm)
            .await?),
        None => Ok(None),
    }
}

async fn apply_snapshot(
    state: &AppState,
    snapshot: SubscriptionSnapshot,
    deleted: bool,
) -> AppResult<()> {
    let Some(sub) = find_for_snapshot(state, &snapshot).await? else {
        tracing::warn!(
            subscription_id = %snapshot.subscription_id,
            "webhook for unknown subscription"
        );
        return Ok(());
    };

    let profile_id: Uuid = sub.profile_id;
    let mut active: subscriptions::ActiveModel = sub.into();
    if deleted {
        active.plan = Set(PlanTier::Free.as_str().to_string());
        active.status = Set(SubscriptionStatus::Canceled.as_str().to_string());
        active.external_subscription_id = Set(None);
        active.cancel_at_period_end = Set(false);
    } else {
        if let Some(plan) = snapshot
            .price_id
            .as_deref()
            .and_then(|price| state.billing.plan_for_price(price))
        {
            active.plan = Set(plan.as_str().to_string());
        }
        active.status = Set(snapshot.status.as_str().to_string());
        active.external_subscription_id = Set(Some(snapshot.subscription_id.clone()));
        active.cancel_at_period_end = Set(snapshot.cancel_at_period_end);
    }
    if let Some(customer) = snapshot.customer_id {
        active.external_customer_id = Set(Some(customer));
    }
    active.current_period_start = Set(snapshot.current_period_start.map(Into::into));
    active.current_period_end = Set(snapshot.current_period_end.map(Into::into));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(
        profile_id = %profile_id,
        plan = %updated.plan,
        status = %updated.status,
        "subscription synced"
    );
    audit::record(
        &state.orm,
        profile_id,
        if deleted { "subscription_deleted" } else { "subscription_updated" },
        "subscriptions",
        serde_json::json!({ "plan": updated.plan, "status": updated.status }),
    )
    .await;
    Ok(())
}
