use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};

use crate::{
    dto::billing::{
        CheckoutRequest, CouponValidation, HostedRedirect, ValidateCouponRequest, WebhookAck,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Subscription,
    response::ApiResponse,
    services::{billing_service, subscription_service},
    state::AppState,
};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscription", get(get_subscription))
        .route("/portal", post(create_portal_session))
        .route("/webhook", post(webhook))
}

pub fn checkout_router() -> Router<AppState> {
    Router::new().route("/session", post(create_checkout_session))
}

pub fn coupon_router() -> Router<AppState> {
    Router::new().route("/validate", post(validate_coupon))
}

#[utoipa::path(
    get,
    path = "/api/billing/subscription",
    responses(
        (status = 200, description = "Current subscription and limits", body = ApiResponse<Subscription>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Billing"
)]
pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Subscription>>> {
    let resp = subscription_service::get_subscription(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/session",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout URL", body = ApiResponse<HostedRedirect>),
        (status = 400, description = "Free plan, invalid coupon or billing disabled"),
        (status = 502, description = "Payment provider error")
    ),
    security(("bearer_auth" = [])),
    tag = "Billing"
)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<HostedRedirect>>> {
    let resp = billing_service::create_checkout_session(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/billing/portal",
    responses(
        (status = 200, description = "Hosted customer portal URL", body = ApiResponse<HostedRedirect>),
        (status = 400, description = "No billing account"),
        (status = 502, description = "Payment provider error")
    ),
    security(("bearer_auth" = [])),
    tag = "Billing"
)]
pub async fn create_portal_session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<HostedRedirect>>> {
    let resp = billing_service::create_portal_session(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Coupon pricing; invalid codes keep the original price", body = ApiResponse<CouponValidation>),
        (status = 502, description = "Payment provider error")
    ),
    tag = "Billing"
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCouponRequest>,
) -> AppResult<Json<ApiResponse<CouponValidation>>> {
    let resp = billing_service::validate_coupon(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/billing/webhook",
    request_body(content = String, description = "Raw processor event payload"),
    responses(
        (status = 200, description = "Event processed", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Missing or invalid signature")
    ),
    tag = "Billing"
)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let resp = billing_service::handle_webhook(&state, &body, signature).await?;
    Ok(Json(resp))
}
