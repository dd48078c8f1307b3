//! Who may do what with a catalogue.
//!
//! Owners have full control, editors change content, viewers only read.
//! Callers with no relationship to a catalogue get `NotFound` so private
//! catalogues are not disclosed.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::invitation::TeamRole,
    entity::{Catalogues, TeamMembers, catalogues, team_members},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Owner,
    Editor,
    Viewer,
}

impl AccessLevel {
    pub fn can_edit(&self) -> bool {
        matches!(self, AccessLevel::Owner | AccessLevel::Editor)
    }
}

impl From<TeamRole> for AccessLevel {
    fn from(role: TeamRole) -> Self {
        match role {
            TeamRole::Editor => AccessLevel::Editor,
            TeamRole::Viewer => AccessLevel::Viewer,
        }
    }
}

#[derive(Debug)]
pub struct CatalogueAccess {
    pub catalogue: catalogues::Model,
    pub level: AccessLevel,
}

pub async fn load_catalogue_for<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<CatalogueAccess> {
    let catalogue = Catalogues::find_by_id(catalogue_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if catalogue.owner_id == user.user_id {
        return Ok(CatalogueAccess {
            catalogue,
            level: AccessLevel::Owner,
        });
    }

    let membership = TeamMembers::find()
        .filter(team_members::Column::CatalogueId.eq(catalogue_id))
        .filter(team_members::Column::ProfileId.eq(user.user_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let role: TeamRole = membership.role.parse().unwrap_or(TeamRole::Viewer);
    Ok(CatalogueAccess {
        catalogue,
        level: role.into(),
    })
}

pub async fn require_edit<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<CatalogueAccess> {
    let access = load_catalogue_for(conn, user, catalogue_id).await?;
    if !access.level.can_edit() {
        return Err(AppError::Forbidden);
    }
    Ok(access)
}

pub async fn require_owner<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<CatalogueAccess> {
    let access = load_catalogue_for(conn, user, catalogue_id).await?;
    if access.level != AccessLevel::Owner {
        return Err(AppError::Forbidden);
    }
    Ok(access)
}

/// Ids of catalogues the user belongs to as a team member.
pub async fn shared_catalogue_ids<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Vec<(Uuid, AccessLevel)>> {
    let rows: Vec<(Uuid, String)> = TeamMembers::find()
        .select_only()
        .column(team_members::Column::CatalogueId)
        .column(team_members::Column::Role)
        .filter(team_members::Column::ProfileId.eq(user_id))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, role)| {
            let role: TeamRole = role.parse().unwrap_or(TeamRole::Viewer);
            (id, role.into())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owners_and_editors_can_edit() {
        assert!(AccessLevel::Owner.can_edit());
        assert!(AccessLevel::Editor.can_edit());
        assert!(!AccessLevel::Viewer.can_edit());
        assert_eq!(AccessLevel::from(TeamRole::Viewer), AccessLevel::Viewer);
    }
}
