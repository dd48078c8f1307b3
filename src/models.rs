use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        invitation::{InvitationStatus, TeamRole},
        plan::{PlanLimits, PlanTier, SubscriptionStatus, effective_plan},
    },
    entity::{catalogues, categories, invitations, products, profiles, subscriptions, team_members},
};

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    /// Plan whose limits currently apply.
    pub effective_plan: PlanTier,
    pub limits: PlanLimits,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub has_billing_account: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Catalogue {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub theme: String,
    #[schema(value_type = Object)]
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub catalogue_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceDisplay {
    #[default]
    Show,
    Hide,
    Contact,
}

impl PriceDisplay {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceDisplay::Show => "show",
            PriceDisplay::Hide => "hide",
            PriceDisplay::Contact => "contact",
        }
    }
}

impl FromStr for PriceDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show" => Ok(PriceDisplay::Show),
            "hide" => Ok(PriceDisplay::Hide),
            "contact" => Ok(PriceDisplay::Contact),
            other => Err(format!("unknown price display '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub catalogue_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "19.90")]
    pub price: Decimal,
    pub price_display: PriceDisplay,
    pub image_urls: Vec<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamMember {
    pub id: Uuid,
    pub catalogue_id: Uuid,
    pub profile_id: Uuid,
    pub email: Option<String>,
    pub role: TeamRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Invitation {
    pub id: Uuid,
    pub catalogue_id: Uuid,
    pub email: String,
    pub role: TeamRole,
    pub status: InvitationStatus,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn from_entity(model: profiles::Model, email: String) -> Self {
        Self {
            id: model.id,
            email,
            full_name: model.full_name,
            company_name: model.company_name,
            phone: model.phone,
            website: model.website,
            address: model.address,
            logo_url: model.logo_url,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<subscriptions::Model> for Subscription {
    fn from(model: subscriptions::Model) -> Self {
        let plan = model.plan.parse().unwrap_or(PlanTier::Free);
        let status = model.status.parse().unwrap_or(SubscriptionStatus::Incomplete);
        let effective = effective_plan(plan, status);
        Self {
            id: model.id,
            profile_id: model.profile_id,
            plan,
            status,
            effective_plan: effective,
            limits: effective.limits(),
            current_period_start: model.current_period_start.map(Into::into),
            current_period_end: model.current_period_end.map(Into::into),
            cancel_at_period_end: model.cancel_at_period_end,
            has_billing_account: model.external_customer_id.is_some(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<catalogues::Model> for Catalogue {
    fn from(model: catalogues::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            is_public: model.is_public,
            theme: model.theme,
            settings: model.settings,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            catalogue_id: model.catalogue_id,
            name: model.name,
            description: model.description,
            color: model.color,
            created_at: model.created_at.into(),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            catalogue_id: model.catalogue_id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            price: model.price,
            price_display: model.price_display.parse().unwrap_or_default(),
            image_urls: serde_json::from_value(model.image_urls).unwrap_or_default(),
            sort_order: model.sort_order,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<team_members::Model> for TeamMember {
    fn from(model: team_members::Model) -> Self {
        Self {
            id: model.id,
            catalogue_id: model.catalogue_id,
            profile_id: model.profile_id,
            email: None,
            role: model.role.parse().unwrap_or(TeamRole::Viewer),
            created_at: model.created_at.into(),
        }
    }
}

impl From<invitations::Model> for Invitation {
    fn from(model: invitations::Model) -> Self {
        Self {
            id: model.id,
            catalogue_id: model.catalogue_id,
            email: model.email,
            role: model.role.parse().unwrap_or(TeamRole::Viewer),
            status: model.status.parse().unwrap_or(InvitationStatus::Expired),
            invited_by: model.invited_by,
            expires_at: model.expires_at.into(),
            accepted_at: model.accepted_at.map(Into::into),
            created_at: model.created_at.into(),
        }
    }
}
