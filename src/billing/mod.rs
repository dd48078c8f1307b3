//! Payment processor integration. All money movement happens on hosted
//! pages; this side only creates sessions, validates promotion codes and
//! mirrors subscription state from webhooks.

pub mod coupon;
pub mod stripe;
pub mod webhook;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::{config::StripeConfig, domain::plan::PlanTier};
use coupon::{Discount, PromotionCode, discount_from_promotion};
use stripe::{CheckoutParams, HostedSession, StripeClient};
use webhook::WebhookEvent;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("billing is not configured")]
    NotConfigured,
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("malformed webhook event: {0}")]
    MalformedEvent(String),
}

#[derive(Clone)]
pub enum BillingGateway {
    Stripe(Arc<StripeBilling>),
    Disabled,
}

pub struct StripeBilling {
    client: StripeClient,
    webhook_secret: Option<SecretString>,
    price_monthly: String,
    price_yearly: String,
}

/// A promotion code the processor accepted.
#[derive(Debug, Clone)]
pub struct AcceptedCode {
    pub promotion_code_id: String,
    pub discount: Discount,
}

impl BillingGateway {
    pub fn from_config(config: Option<&StripeConfig>) -> Self {
        match config {
            Some(cfg) => BillingGateway::Stripe(Arc::new(StripeBilling {
                client: StripeClient::new(cfg.secret_key.clone(), cfg.api_base.clone()),
                webhook_secret: cfg.webhook_secret.clone(),
                price_monthly: cfg.price_monthly.clone(),
                price_yearly: cfg.price_yearly.clone(),
            })),
            None => {
                tracing::info!("payment processor not configured; billing disabled");
                BillingGateway::Disabled
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, BillingGateway::Stripe(_))
    }

    fn stripe(&self) -> Result<&StripeBilling, BillingError> {
        match self {
            BillingGateway::Stripe(inner) => Ok(inner.as_ref()),
            BillingGateway::Disabled => Err(BillingError::NotConfigured),
        }
    }

    /// Plan matching a processor price id.
    pub fn plan_for_price(&self, price_id: &str) -> Option<PlanTier> {
        let inner = self.stripe().ok()?;
        if price_id == inner.price_monthly {
            Some(PlanTier::Monthly)
        } else if price_id == inner.price_yearly {
            Some(PlanTier::Yearly)
        } else {
            None
        }
    }

    /// Look up a customer-facing code. Disabled billing accepts no codes.
    pub async fn accept_code(&self, code: &str) -> Result<Option<AcceptedCode>, BillingError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        let inner = match self {
            BillingGateway::Stripe(inner) => inner,
            BillingGateway::Disabled => return Ok(None),
        };
        let promo: Option<PromotionCode> = inner.client.find_promotion_code(code).await?;
        Ok(promo.and_then(|promo| {
            discount_from_promotion(&promo).map(|discount| AcceptedCode {
                promotion_code_id: promo.id.clone(),
                discount,
            })
        }))
    }

    pub async fn checkout(
        &self,
        plan: PlanTier,
        params: CheckoutRequestParams<'_>,
    ) -> Result<HostedSession, BillingError> {
        let inner = self.stripe()?;
        let price_id = match plan {
            PlanTier::Monthly => inner.price_monthly.as_str(),
            PlanTier::Yearly => inner.price_yearly.as_str(),
            PlanTier::Free => {
                return Err(BillingError::Api {
                    status: 400,
                    message: "the free plan has no checkout".into(),
                });
            }
        };
        inner
            .client
            .create_checkout_session(&CheckoutParams {
                price_id,
                plan,
                profile_id: params.profile_id,
                customer_id: params.customer_id,
                customer_email: params.customer_email,
                promotion_code_id: params.promotion_code_id,
                success_url: params.success_url,
                cancel_url: params.cancel_url,
            })
            .await
    }

    pub async fn portal(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, BillingError> {
        self.stripe()?
            .client
            .create_portal_session(customer_id, return_url)
            .await
    }

    /// Verify and decode a webhook delivery.
    pub fn receive_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<WebhookEvent, BillingError> {
        let secret = self
            .stripe()?
            .webhook_secret
            .as_ref()
            .ok_or(BillingError::NotConfigured)?;
        webhook::verify_signature(payload, signature, secret.expose_secret(), now)?;
        webhook::parse_event(payload)
    }
}

#[derive(Debug)]
pub struct CheckoutRequestParams<'a> {
    pub profile_id: uuid::Uuid,
    pub customer_id: Option<&'a str>,
    pub customer_email: &'a str,
    pub promotion_code_id: Option<&'a str>,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> BillingGateway {
        BillingGateway::from_config(Some(&StripeConfig {
            secret_key: SecretString::from("sk_test_123".to_string()),
            webhook_secret: Some(SecretString::from("whsec_abc".to_string())),
            price_monthly: "price_m".into(),
            price_yearly: "price_y".into(),
            api_base: "http://127.0.0.1:9".into(),
        }))
    }

    #[test]
    fn maps_prices_to_plans() {
        let billing = gateway();
        assert!(billing.is_enabled());
        assert_eq!(billing.plan_for_price("price_m"), Some(PlanTier::Monthly));
        assert_eq!(billing.plan_for_price("price_y"), Some(PlanTier::Yearly));
        assert_eq!(billing.plan_for_price("price_other"), None);
        assert_eq!(BillingGateway::Disabled.plan_for_price("price_m"), None);
    }

    #[tokio::test]
    async fn disabled_billing_accepts_no_codes() {
        let accepted = BillingGateway::Disabled.accept_code("SPRING25").await.unwrap();
        assert!(accepted.is_none());
        assert!(matches!(
            BillingGateway::Disabled.portal("cus_1", "http://x").await,
            Err(BillingError::NotConfigured)
        ));
    }

    #[test]
    fn webhook_requires_valid_signature() {
        let billing = gateway();
        let payload = br#"{"type":"invoice.paid","data":{"object":{}}}"#;
        let header = webhook::signature_header(payload, "whsec_abc", 1_700_000_000).unwrap();

        let event = billing.receive_webhook(payload, &header, 1_700_000_010).unwrap();
        assert_eq!(event, WebhookEvent::Ignored("invoice.paid".into()));

        assert!(matches!(
            billing.receive_webhook(payload, "t=1700000000,v1=00", 1_700_000_010),
            Err(BillingError::InvalidSignature)
        ));
    }
}
