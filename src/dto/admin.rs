use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::plan::{PlanTier, SubscriptionStatus},
    models::Catalogue,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanCount {
    pub plan: PlanTier,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub users: u64,
    pub catalogues: u64,
    pub products: u64,
    pub exports: u64,
    pub subscriptions: Vec<PlanCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub company_name: Option<String>,
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserList {
    pub items: Vec<AdminUser>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminCatalogueList {
    pub items: Vec<Catalogue>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPlanRequest {
    pub plan: PlanTier,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeStat {
    pub theme_id: String,
    pub selections: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeStats {
    pub items: Vec<ThemeStat>,
}
