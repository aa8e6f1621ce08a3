use sea_orm::entity::prelude::*;

/// One immutable revision of a deal's notes. Rows are append-only;
/// `version_number` is assigned by the service, never by callers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "versions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub deal_id: Uuid,
    pub version_number: i32,
    #[sea_orm(column_type = "Text")]
    pub use_cases: String,
    #[sea_orm(column_type = "Text")]
    pub roadblocks: String,
    #[sea_orm(column_type = "Text")]
    pub solution_recommendations: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub additional_comments: Option<String>,
    pub edited_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deal::Entity",
        from = "Column::DealId",
        to = "super::deal::Column::Id",
        on_delete = "Cascade"
    )]
    Deal,
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
