//! Subscription plans and the limits they gate.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Monthly,
    Yearly,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Monthly, PlanTier::Yearly];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Monthly => "monthly",
            PlanTier::Yearly => "yearly",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }

    /// List price per billing period, in the account currency.
    pub fn price(&self) -> Decimal {
        match self {
            PlanTier::Free => Decimal::ZERO,
            PlanTier::Monthly => Decimal::new(1900, 2),
            PlanTier::Yearly => Decimal::new(19000, 2),
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            PlanTier::Free => PlanLimits {
                max_catalogues: Some(1),
                max_exports_per_period: Some(0),
                premium_themes: false,
                team_collaboration: false,
            },
            PlanTier::Monthly => PlanLimits {
                max_catalogues: Some(10),
                max_exports_per_period: Some(50),
                premium_themes: true,
                team_collaboration: true,
            },
            PlanTier::Yearly => PlanLimits {
                max_catalogues: None,
                max_exports_per_period: None,
                premium_themes: true,
                team_collaboration: true,
            },
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "monthly" => Ok(PlanTier::Monthly),
            "yearly" => Ok(PlanTier::Yearly),
            other => Err(format!("unknown plan '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
        }
    }

    /// Whether the plan's features are unlocked in this state.
    pub fn is_entitled(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    /// Map a payment processor status string. Unknown states lock paid features.
    pub fn from_processor(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" | "unpaid" | "paused" => SubscriptionStatus::PastDue,
            "canceled" | "incomplete_expired" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Incomplete,
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "incomplete" => Ok(SubscriptionStatus::Incomplete),
            other => Err(format!("unknown subscription status '{other}'")),
        }
    }
}

/// Plan the account is entitled to right now.
pub fn effective_plan(plan: PlanTier, status: SubscriptionStatus) -> PlanTier {
    if status.is_entitled() { plan } else { PlanTier::Free }
}

/// `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanLimits {
    pub max_catalogues: Option<u64>,
    pub max_exports_per_period: Option<u64>,
    pub premium_themes: bool,
    pub team_collaboration: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanDenial {
    #[error("the {plan} plan allows at most {limit} catalogue(s); upgrade to create more")]
    CatalogueLimit { plan: PlanTier, limit: u64 },
    #[error("PDF export is not available on the {plan} plan; upgrade to export")]
    ExportUnavailable { plan: PlanTier },
    #[error("the {plan} plan allows {limit} export(s) per billing period")]
    ExportLimit { plan: PlanTier, limit: u64 },
    #[error("theme '{theme}' requires a paid plan")]
    PremiumTheme { theme: String },
    #[error("team collaboration requires a paid plan")]
    TeamUnavailable,
}

pub fn check_catalogue_quota(plan: PlanTier, owned: u64) -> Result<(), PlanDenial> {
    match plan.limits().max_catalogues {
        Some(limit) if owned >= limit => Err(PlanDenial::CatalogueLimit { plan, limit }),
        _ => Ok(()),
    }
}

pub fn check_export_quota(plan: PlanTier, used_this_period: u64) -> Result<(), PlanDenial> {
    match plan.limits().max_exports_per_period {
        Some(0) => Err(PlanDenial::ExportUnavailable { plan }),
        Some(limit) if used_this_period >= limit => Err(PlanDenial::ExportLimit { plan, limit }),
        _ => Ok(()),
    }
}

pub fn check_theme_access(plan: PlanTier, theme: &str, premium: bool) -> Result<(), PlanDenial> {
    if premium && !plan.limits().premium_themes {
        return Err(PlanDenial::PremiumTheme {
            theme: theme.to_string(),
        });
    }
    Ok(())
}

pub fn check_team_access(plan: PlanTier) -> Result<(), PlanDenial> {
    if plan.limits().team_collaboration {
        Ok(())
    } else {
        Err(PlanDenial::TeamUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_allows_a_single_catalogue() {
        assert!(check_catalogue_quota(PlanTier::Free, 0).is_ok());
        assert_eq!(
            check_catalogue_quota(PlanTier::Free, 1),
            Err(PlanDenial::CatalogueLimit { plan: PlanTier::Free, limit: 1 })
        );
        assert!(check_catalogue_quota(PlanTier::Yearly, 10_000).is_ok());
        assert!(check_catalogue_quota(PlanTier::Monthly, 10).is_err());
    }

    #[test]
    fn free_plan_cannot_export() {
        assert_eq!(
            check_export_quota(PlanTier::Free, 0),
            Err(PlanDenial::ExportUnavailable { plan: PlanTier::Free })
        );
        assert!(check_export_quota(PlanTier::Monthly, 49).is_ok());
        assert!(matches!(
            check_export_quota(PlanTier::Monthly, 50),
            Err(PlanDenial::ExportLimit { limit: 50, .. })
        ));
        assert!(check_export_quota(PlanTier::Yearly, 5_000).is_ok());
    }

    #[test]
    fn premium_themes_and_teams_need_paid_plan() {
        assert!(check_theme_access(PlanTier::Free, "classic", false).is_ok());
        assert!(check_theme_access(PlanTier::Free, "boutique", true).is_err());
        assert!(check_theme_access(PlanTier::Monthly, "boutique", true).is_ok());
        assert_eq!(check_team_access(PlanTier::Free), Err(PlanDenial::TeamUnavailable));
        assert!(check_team_access(PlanTier::Yearly).is_ok());
    }

    #[test]
    fn lapsed_subscription_falls_back_to_free() {
        assert_eq!(
            effective_plan(PlanTier::Yearly, SubscriptionStatus::Active),
            PlanTier::Yearly
        );
        assert_eq!(
            effective_plan(PlanTier::Monthly, SubscriptionStatus::Trialing),
            PlanTier::Monthly
        );
        assert_eq!(
            effective_plan(PlanTier::Monthly, SubscriptionStatus::PastDue),
            PlanTier::Free
        );
        assert_eq!(
            effective_plan(PlanTier::Yearly, SubscriptionStatus::Canceled),
            PlanTier::Free
        );
    }

    #[test]
    fn processor_statuses_map_conservatively() {
        assert_eq!(SubscriptionStatus::from_processor("active"), SubscriptionStatus::Active);
        assert_eq!(SubscriptionStatus::from_processor("unpaid"), SubscriptionStatus::PastDue);
        assert_eq!(
            SubscriptionStatus::from_processor("incomplete_expired"),
            SubscriptionStatus::Canceled
        );
        assert_eq!(
            SubscriptionStatus::from_processor("something_new"),
            SubscriptionStatus::Incomplete
        );
    }

    #[test]
    fn plan_names_round_trip_through_storage_strings() {
        for plan in PlanTier::ALL {
            assert_eq!(plan.as_str().parse::<PlanTier>(), Ok(plan));
        }
        assert!("enterprise".parse::<PlanTier>().is_err());
    }
}
