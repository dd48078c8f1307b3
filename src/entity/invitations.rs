use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub catalogue_id: Uuid,
    pub email: String,
    pub role: String,
    #[sea_orm(unique)]
    pub token: String,
    pub invited_by: Uuid,
    pub status: String,
    pub expires_at: DateTimeWithTimeZone,
    pub accepted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalogues::Entity",
        from = "Column::CatalogueId",
        to = "super::catalogues::Column::Id"
    )]
    Catalogues,
}

impl Related<super::catalogues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Catalogues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
