mod common;

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use catfy_api::{
    billing::webhook::signature_header,
    domain::plan::{PlanTier, SubscriptionStatus},
    dto::billing::{CheckoutRequest, ValidateCouponRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::{billing_service, subscription_service},
    state::AppState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Value, json};

async fn deliver(state: &AppState, event: Value) -> Result<String, AppError> {
    let payload = serde_json::to_vec(&event).unwrap();
    let header = signature_header(&payload, common::WEBHOOK_SECRET, Utc::now().timestamp()).unwrap();
    let ack = billing_service::handle_webhook(state, &payload, Some(&header))
        .await?
        .data
        .unwrap();
    assert!(ack.received);
    Ok(ack.event)
}

async fn subscription(state: &AppState, user: &AuthUser) -> catfy_api::models::Subscription {
    subscription_service::get_subscription(state, user)
        .await
        .unwrap()
        .data
        .unwrap()
}

#[tokio::test]
async fn webhooks_drive_the_subscription_lifecycle() -> anyhow::Result<()> {
    let Some(state) = common::db_state(true).await? else {
        return Ok(());
    };
    let user = common::register(&state, "payer").await?;

    let fresh = subscription(&state, &user).await;
    assert_eq!(fresh.plan, PlanTier::Free);
    assert!(!fresh.has_billing_account);

    let customer = format!("cus_{}", user.user_id.simple());
    let external = format!("sub_{}", user.user_id.simple());

    let event = deliver(
        &state,
        json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "client_reference_id": user.user_id.to_string(),
                "customer": customer,
                "subscription": external,
                "metadata": { "plan": "monthly" }
            }}
        }),
    )
    .await?;
    assert_eq!(event, "checkout.session.completed");
    let paid = subscription(&state, &user).await;
    assert_eq!(paid.effective_plan, PlanTier::Monthly);
    assert!(paid.has_billing_account);

    let start = Utc::now().timestamp() - 3600;
    deliver(
        &state,
        json!({
            "type": "customer.subscription.updated",
            "data": { "object": {
                "id": external,
                "customer": customer,
                "status": "past_due",
                "cancel_at_period_end": true,
                "current_period_start": start,
                "current_period_end": start + 365 * 86_400,
                "items": { "data": [ { "price": { "id": "price_yearly_test" } } ] }
            }}
        }),
    )
    .await?;
    let lapsed = subscription(&state, &user).await;
    assert_eq!(lapsed.plan, PlanTier::Yearly);
    assert_eq!(lapsed.status, SubscriptionStatus::PastDue);
    assert_eq!(lapsed.effective_plan, PlanTier::Free);
    assert!(lapsed.cancel_at_period_end);
    assert!(lapsed.current_period_start.is_some());

    deliver(
        &state,
        json!({
            "type": "customer.subscription.deleted",
            "data": { "object": {
                "id": external,
                "customer": customer,
                "status": "canceled"
            }}
        }),
    )
    .await?;
    let canceled = subscription(&state, &user).await;
    assert_eq!(canceled.plan, PlanTier::Free);
    assert_eq!(canceled.status, SubscriptionStatus::Canceled);

    Ok(())
}

#[tokio::test]
async fn webhook_rejects_bad_signatures_and_free_checkout() -> anyhow::Result<()> {
    let Some(state) = common::db_state(true).await? else {
        return Ok(());
    };
    let user = common::register(&state, "checkout").await?;

    let payload = br#"{"type":"invoice.paid","data":{"object":{}}}"#;
    let forged = billing_service::handle_webhook(
        &state,
        payload,
        Some("t=1700000000,v1=deadbeef"),
    )
    .await;
    assert!(matches!(forged, Err(AppError::BadRequest(_))));

    let ignored = deliver(&state, json!({ "type": "invoice.paid", "data": { "object": {} } })).await?;
    assert_eq!(ignored, "invoice.paid");

    let free = billing_service::create_checkout_session(
        &state,
        &user,
        CheckoutRequest {
            plan: PlanTier::Free,
            coupon_code: None,
        },
    )
    .await;
    assert!(matches!(free, Err(AppError::BadRequest(_))));

    Ok(())
}

fn promotion(code: &str, active: bool, percent_off: f64) -> Value {
    json!({
        "id": format!("promo_{code}"),
        "object": "promotion_code",
        "code": code,
        "active": active,
        "coupon": {
            "id": format!("co_{code}"),
            "object": "coupon",
            "valid": true,
            "percent_off": percent_off,
            "amount_off": null,
            "currency": null
        }
    })
}

async fn promotion_codes(Query(query): Query<HashMap<String, String>>) -> Response {
    let code = query.get("code").map(String::as_str).unwrap_or_default();
    match code {
        "SPRING25" => Json(json!({ "object": "list", "data": [promotion(code, true, 25.0)] }))
            .into_response(),
        "RETIRED" => Json(json!({ "object": "list", "data": [promotion(code, false, 50.0)] }))
            .into_response(),
        "BROKEN" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid request" } })),
        )
            .into_response(),
        _ => Json(json!({ "object": "list", "data": [] })).into_response(),
    }
}

/// Serve a stand-in for the processor's promotion code lookup on a random port.
async fn fake_processor() -> anyhow::Result<String> {
    let app = Router::new().route("/v1/promotion_codes", get(promotion_codes));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn coupon_request(code: &str) -> ValidateCouponRequest {
    ValidateCouponRequest {
        code: code.into(),
        plan: PlanTier::Monthly,
    }
}

#[tokio::test]
async fn processor_codes_drive_coupon_validation() -> anyhow::Result<()> {
    let state = common::offline_billing_state(&fake_processor().await?);

    let accepted = billing_service::validate_coupon(&state, coupon_request("SPRING25"))
        .await?
        .data
        .unwrap();
    assert!(accepted.valid);
    assert!(accepted.discount.is_some());
    assert_eq!(accepted.original_price, Decimal::new(1900, 2));
    assert_eq!(accepted.final_price, Decimal::new(1425, 2));
    assert!(accepted.final_price < accepted.original_price);

    for code in ["RETIRED", "NOSUCHCODE"] {
        let rejected = billing_service::validate_coupon(&state, coupon_request(code))
            .await?
            .data
            .unwrap();
        assert!(!rejected.valid, "{code} should not validate");
        assert!(rejected.discount.is_none());
        assert_eq!(rejected.final_price, rejected.original_price);
    }

    let free = billing_service::validate_coupon(
        &state,
        ValidateCouponRequest {
            code: "SPRING25".into(),
            plan: PlanTier::Free,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!free.valid);
    assert_eq!(free.final_price, Decimal::ZERO);

    let failed = billing_service::validate_coupon(&state, coupon_request("BROKEN")).await;
    let err = failed.err().expect("processor error");
    assert!(matches!(err, AppError::PaymentGateway(_)));
    assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

    Ok(())
}
