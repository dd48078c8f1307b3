//! Minimal client for the Stripe REST API: hosted checkout, customer portal
//! and promotion-code lookup.

use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use super::{BillingError, coupon::PromotionCode};
use crate::domain::plan::PlanTier;

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: SecretString,
    api_base: String,
}

/// A hosted page the browser is redirected to.
#[derive(Debug, Clone, Deserialize)]
pub struct HostedSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug)]
pub struct CheckoutParams<'a> {
    pub price_id: &'a str,
    pub plan: PlanTier,
    pub profile_id: Uuid,
    pub customer_id: Option<&'a str>,
    pub customer_email: &'a str,
    pub promotion_code_id: Option<&'a str>,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: SecretString, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_checkout_session(
        &self,
        params: &CheckoutParams<'_>,
    ) -> Result<HostedSession, BillingError> {
        let profile_id = params.profile_id.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "subscription"),
            ("line_items[0][price]", params.price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", params.success_url),
            ("cancel_url", params.cancel_url),
            ("client_reference_id", &profile_id),
            ("metadata[profile_id]", &profile_id),
            ("metadata[plan]", params.plan.as_str()),
            ("subscription_data[metadata][profile_id]", &profile_id),
            ("subscription_data[metadata][plan]", params.plan.as_str()),
        ];
        match params.customer_id {
            Some(customer) => form.push(("customer", customer)),
            None => form.push(("customer_email", params.customer_email)),
        }
        match params.promotion_code_id {
            Some(promo) => form.push(("discounts[0][promotion_code]", promo)),
            None => form.push(("allow_promotion_codes", "true")),
        }

        let request = self.request(reqwest::Method::POST, "/v1/checkout/sessions").form(&form);
        self.send(request).await
    }

    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, BillingError> {
        let form = [("customer", customer_id), ("return_url", return_url)];
        let request = self
            .request(reqwest::Method::POST, "/v1/billing_portal/sessions")
            .form(&form);
        self.send(request).await
    }

    /// Look up an active promotion code by its customer-facing code.
    pub async fn find_promotion_code(
        &self,
        code: &str,
    ) -> Result<Option<PromotionCode>, BillingError> {
        let request = self
            .request(reqwest::Method::GET, "/v1/promotion_codes")
            .query(&[("code", code), ("active", "true"), ("limit", "1")]);
        let list: ListResponse<PromotionCode> = self.send(request).await?;
        Ok(list.data.into_iter().next())
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(self.secret_key.expose_secret())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BillingError> {
        let response = request.send().await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, BillingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|env| env.error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        tracing::warn!(status = %status, message = %message, "payment provider rejected request");
        Err(BillingError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
