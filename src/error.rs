use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    billing::BillingError,
    domain::{
        invitation::InvitationError, ordering::OrderingError, plan::PlanDenial,
        settings::SettingsError,
    },
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict {0}")]
    Conflict(String),

    #[error("Upgrade required: {0}")]
    UpgradeRequired(String),

    #[error("Payment provider error")]
    PaymentGateway(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UpgradeRequired(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            AppError::PaymentGateway(detail) => {
                tracing::error!(detail = %detail, "payment provider error")
            }
            _ => {}
        }

        let message = self.to_string();
        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<OrderingError> for AppError {
    fn from(err: OrderingError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<PlanDenial> for AppError {
    fn from(err: PlanDenial) -> Self {
        AppError::UpgradeRequired(err.to_string())
    }
}

impl From<InvitationError> for AppError {
    fn from(err: InvitationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::NotConfigured => {
                AppError::BadRequest("Billing is not configured".into())
            }
            BillingError::InvalidSignature | BillingError::MalformedEvent(_) => {
                AppError::BadRequest(err.to_string())
            }
            BillingError::Http(_) | BillingError::Api { .. } => {
                AppError::PaymentGateway(err.to_string())
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
