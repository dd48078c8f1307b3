use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        invitation::{InvitationError, InvitationStatus, generate_token, normalize_email},
        plan::check_team_access,
    },
    dto::team::{AcceptInvitationRequest, CreatedInvitation, InviteMemberRequest, TeamOverview},
    entity::{Invitations, TeamMembers, Users, invitations, team_members, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Invitation, TeamMember},
    response::{ApiResponse, Meta, empty_data},
    services::{
        access::{load_catalogue_for, require_owner},
        subscription_service::current_plan,
    },
    state::AppState,
};

async fn emails_for(state: &AppState, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, String)> = Users::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Email)
        .filter(users::Column::Id.is_in(ids))
        .into_tuple()
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().collect())
}

pub async fn get_team(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<ApiResponse<TeamOverview>> {
    load_catalogue_for(&state.orm, user, catalogue_id).await?;

    let members = TeamMembers::find()
        .filter(team_members::Column::CatalogueId.eq(catalogue_id))
        .order_by_asc(team_members::Column::CreatedAt)
        .all(&state.orm)
        .await?;
    let emails = emails_for(state, members.iter().map(|m| m.profile_id).collect()).await?;
    let members = members
        .into_iter()
        .map(|model| {
            let email = emails.get(&model.profile_id).cloned();
            TeamMember {
                email,
                ..TeamMember::from(model)
            }
        })
        .collect();

    let invitations = Invitations::find()
        .filter(invitations::Column::CatalogueId.eq(catalogue_id))
        .filter(invitations::Column::Status.eq(InvitationStatus::Pending.as_str()))
        .order_by_desc(invitations::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    Ok(ApiResponse::success(
        "Team",
        TeamOverview {
            members,
            invitations,
        },
        None,
    ))
}

pub async fn invite_member(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    payload: InviteMemberRequest,
) -> AppResult<ApiResponse<CreatedInvitation>> {
    require_owner(&state.orm, user, catalogue_id).await?;
    check_team_access(current_plan(&state.orm, user.user_id).await?)?;

    let email = normalize_email(&payload.email);
    if !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    if email == normalize_email(&user.email) {
        return Err(AppError::BadRequest("You already own this catalogue".into()));
    }

    let invitee = Users::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if let Some(invitee) = invitee {
        let already_member = TeamMembers::find()
            .filter(team_members::Column::CatalogueId.eq(catalogue_id))
            .filter(team_members::Column::ProfileId.eq(invitee.id))
            .one(&state.orm)
            .await?;
        if already_member.is_some() {
            return Err(AppError::Conflict("User is already a team member".into()));
        }
    }

    let pending = Invitations::find()
        .filter(invitations::Column::CatalogueId.eq(catalogue_id))
        .filter(invitations::Column::Email.eq(email.as_str()))
        .filter(invitations::Column::Status.eq(InvitationStatus::Pending.as_str()))
        .one(&state.orm)
        .await?;
    if let Some(pending) = pending {
        if DateTime::<Utc>::from(pending.expires_at) > Utc::now() {
            return Err(AppError::Conflict("An invitation is already pending".into()));
        }
        let mut stale: invitations::ActiveModel = pending.into();
        stale.status = Set(InvitationStatus::Expired.as_str().to_string());
        stale.update(&state.orm).await?;
    }

    let now = Utc::now();
    let token = generate_token();
    let invitation = invitations::ActiveModel {
        id: Set(Uuid::new_v4()),
        catalogue_id: Set(catalogue_id),
        email: Set(email),
        role: Set(payload.role.as_str().to_string()),
        token: Set(token.clone()),
        invited_by: Set(user.user_id),
        status: Set(InvitationStatus::Pending.as_str().to_string()),
        expires_at: Set((now + Duration::days(state.config.invitation_ttl_days)).into()),
        accepted_at: Set(None),
        created_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "team_invite",
        "invitations",
        serde_json::json!({ "catalogue_id": catalogue_id, "invitation_id": invitation.id }),
    )
    .await;

    let accept_url = format!("{}/invitations/accept?token={token}", state.config.app_base_url);
    Ok(ApiResponse::success(
        "Invitation created",
        CreatedInvitation {
            invitation: Invitation::from(invitation),
            token,
            accept_url,
        },
        Some(Meta::empty()),
    ))
}

pub async fn cancel_invitation(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    invitation_id: Uuid,
) -> AppResult<ApiResponse<Invitation>> {
    require_owner(&state.orm, user, catalogue_id).await?;
    let existing = Invitations::find_by_id(invitation_id)
        .filter(invitations::Column::CatalogueId.eq(catalogue_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let status: InvitationStatus = existing.status.parse().map_err(anyhow::Error::msg)?;
    let next = status.cancel()?;

    let mut active: invitations::ActiveModel = existing.into();
    active.status = Set(next.as_str().to_string());
    let invitation = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "team_invite_cancel",
        "invitations",
        serde_json::json!({ "catalogue_id": catalogue_id, "invitation_id": invitation_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Invitation cancelled",
        Invitation::from(invitation),
        Some(Meta::empty()),
    ))
}

pub async fn remove_member(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    member_id: Uuid,
) -> AppResult<ApiResponse<Value>> {
    require_owner(&state.orm, user, catalogue_id).await?;
    let result = TeamMembers::delete_many()
        .filter(team_members::Column::Id.eq(member_id))
        .filter(team_members::Column::CatalogueId.eq(catalogue_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "team_member_remove",
        "team_members",
        serde_json::json!({ "catalogue_id": catalogue_id, "member_id": member_id }),
    )
    .await;

    Ok(ApiResponse::success("Removed", empty_data(), Some(Meta::empty())))
}

/// Accept an invitation addressed to the caller's email. Expired
/// invitations are marked as such and rejected.
pub async fn accept_invitation(
    state: &AppState,
    user: &AuthUser,
    payload: AcceptInvitationRequest,
) -> AppResult<ApiResponse<TeamMember>> {
    let existing = Invitations::find()
        .filter(invitations::Column::Token.eq(payload.token.trim()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.email != normalize_email(&user.email) {
        return Err(AppError::Forbidden);
    }

    let now = Utc::now();
    let status: InvitationStatus = existing.status.parse().map_err(anyhow::Error::msg)?;
    let accepted = match status.accept(existing.expires_at.into(), now) {
        Ok(next) => next,
        Err(InvitationError::Expired) => {
            let mut active: invitations::ActiveModel = existing.into();
            active.status = Set(InvitationStatus::Expired.as_str().to_string());
            active.update(&state.orm).await?;
            return Err(InvitationError::Expired.into());
        }
        Err(err) => return Err(err.into()),
    };

    let already_member = TeamMembers::find()
        .filter(team_members::Column::CatalogueId.eq(existing.catalogue_id))
        .filter(team_members::Column::ProfileId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    if already_member.is_some() {
        return Err(AppError::Conflict("You are already a team member".into()));
    }

    let catalogue_id = existing.catalogue_id;
    let role = existing.role.clone();
    let txn = state.orm.begin().await?;
    let mut active: invitations::ActiveModel = existing.into();
    active.status = Set(accepted.as_str().to_string());
    active.accepted_at = Set(Some(now.into()));
    let invitation = active.update(&txn).await?;

    let member = team_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        catalogue_id: Set(catalogue_id),
        profile_id: Set(user.user_id),
        role: Set(role),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "team_invite_accept",
        "invitations",
        serde_json::json!({ "catalogue_id": catalogue_id, "invitation_id": invitation.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Invitation accepted",
        TeamMember {
            email: Some(user.email.clone()),
            ..TeamMember::from(member)
        },
        Some(Meta::empty()),
    ))
}
