use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "catalogue_exports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Kept after the catalogue is deleted so exports still count toward quota.
    pub catalogue_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub page_count: i32,
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
