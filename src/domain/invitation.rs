//! Team roles and the invitation lifecycle.
//!
//! `pending` is the only state with outgoing transitions:
//! pending -> accepted | cancelled | expired.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Editor,
    Viewer,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Editor => "editor",
            TeamRole::Viewer => "viewer",
        }
    }
}

impl FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(TeamRole::Editor),
            "viewer" => Ok(TeamRole::Viewer),
            other => Err(format!("unknown team role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Cancelled,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Cancelled => "cancelled",
            InvitationStatus::Expired => "expired",
        }
    }

    /// Status after the invitee accepts at `now`.
    pub fn accept(self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<Self, InvitationError> {
        self.ensure_pending()?;
        if now >= expires_at {
            return Err(InvitationError::Expired);
        }
        Ok(InvitationStatus::Accepted)
    }

    /// Status after the inviter cancels.
    pub fn cancel(self) -> Result<Self, InvitationError> {
        self.ensure_pending()?;
        Ok(InvitationStatus::Cancelled)
    }

    fn ensure_pending(self) -> Result<(), InvitationError> {
        if self == InvitationStatus::Pending {
            Ok(())
        } else {
            Err(InvitationError::NotPending(self))
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "cancelled" => Ok(InvitationStatus::Cancelled),
            "expired" => Ok(InvitationStatus::Expired),
            other => Err(format!("unknown invitation status '{other}'")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvitationError {
    #[error("invitation is {0}, not pending")]
    NotPending(InvitationStatus),
    #[error("invitation has expired")]
    Expired,
}

/// Random 32-byte token, hex encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn pending_invitation_can_be_accepted_before_expiry() {
        let now = Utc::now();
        let status = InvitationStatus::Pending.accept(now + Duration::days(1), now);
        assert_eq!(status, Ok(InvitationStatus::Accepted));
    }

    #[test]
    fn expired_invitation_is_rejected() {
        let now = Utc::now();
        let status = InvitationStatus::Pending.accept(now - Duration::seconds(1), now);
        assert_eq!(status, Err(InvitationError::Expired));
    }

    #[test]
    fn only_pending_invitations_transition() {
        let later = Utc::now() + Duration::days(3);
        for status in [
            InvitationStatus::Accepted,
            InvitationStatus::Cancelled,
            InvitationStatus::Expired,
        ] {
            assert_eq!(
                status.accept(later, Utc::now()),
                Err(InvitationError::NotPending(status))
            );
            assert_eq!(status.cancel(), Err(InvitationError::NotPending(status)));
        }
        assert_eq!(InvitationStatus::Pending.cancel(), Ok(InvitationStatus::Cancelled));
    }

    #[test]
    fn tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn emails_compare_case_insensitively() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
