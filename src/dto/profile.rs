use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Profile, Subscription};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileWithSubscription {
    pub profile: Profile,
    pub subscription: Subscription,
}

/// Omitted fields are left unchanged; an empty string clears the field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}
