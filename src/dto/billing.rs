use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{billing::coupon::Discount, domain::plan::PlanTier};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub plan: PlanTier,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HostedRedirect {
    pub url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub plan: PlanTier,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponValidation {
    pub code: String,
    pub valid: bool,
    pub discount: Option<Discount>,
    #[schema(value_type = String)]
    pub original_price: Decimal,
    #[schema(value_type = String)]
    pub final_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
    pub event: String,
}
