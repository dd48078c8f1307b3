use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::invitation::TeamRole,
    models::{Invitation, TeamMember},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: TeamRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamOverview {
    pub members: Vec<TeamMember>,
    pub invitations: Vec<Invitation>,
}

/// Returned to the inviter only; carries the token to share with the invitee.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedInvitation {
    pub invitation: Invitation,
    pub token: String,
    pub accept_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AcceptInvitationRequest {
    pub token: String,
}
