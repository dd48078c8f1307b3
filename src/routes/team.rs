use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::team::{AcceptInvitationRequest, CreatedInvitation, InviteMemberRequest, TeamOverview},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Invitation, TeamMember},
    response::ApiResponse,
    services::team_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/team", get(get_team).post(invite_member))
        .route(
            "/{id}/team/invitations/{invitation_id}",
            delete(cancel_invitation),
        )
        .route("/{id}/team/members/{member_id}", delete(remove_member))
}

pub fn invitation_router() -> Router<AppState> {
    Router::new().route("/accept", post(accept_invitation))
}

#[utoipa::path(
    get,
    path = "/api/catalogues/{id}/team",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    responses(
        (status = 200, description = "Members and pending invitations", body = ApiResponse<TeamOverview>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn get_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TeamOverview>>> {
    let resp = team_service::get_team(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalogues/{id}/team",
    params(("id" = Uuid, Path, description = "Catalogue ID")),
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Invitation created", body = ApiResponse<CreatedInvitation>),
        (status = 402, description = "Team collaboration requires a paid plan"),
        (status = 403, description = "Only the owner can invite"),
        (status = 409, description = "Already a member or already invited")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn invite_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InviteMemberRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedInvitation>>)> {
    let resp = team_service::invite_member(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/catalogues/{id}/team/invitations/{invitation_id}",
    params(
        ("id" = Uuid, Path, description = "Catalogue ID"),
        ("invitation_id" = Uuid, Path, description = "Invitation ID")
    ),
    responses(
        (status = 200, description = "Invitation cancelled", body = ApiResponse<Invitation>),
        (status = 400, description = "Invitation is no longer pending"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn cancel_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, invitation_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Invitation>>> {
    let resp = team_service::cancel_invitation(&state, &user, id, invitation_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/catalogues/{id}/team/members/{member_id}",
    params(
        ("id" = Uuid, Path, description = "Catalogue ID"),
        ("member_id" = Uuid, Path, description = "Team member ID")
    ),
    responses(
        (status = 200, description = "Member removed"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let resp = team_service::remove_member(&state, &user, id, member_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/invitations/accept",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Invitation accepted", body = ApiResponse<TeamMember>),
        (status = 400, description = "Invitation expired or no longer pending"),
        (status = 403, description = "Invitation is for another email"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AcceptInvitationRequest>,
) -> AppResult<Json<ApiResponse<TeamMember>>> {
    let resp = team_service::accept_invitation(&state, &user, payload).await?;
    Ok(Json(resp))
}
