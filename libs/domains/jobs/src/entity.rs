use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `jobs` table (governing design document §6):
/// `jobs(id pk, type, data, message, priority, delay_seconds, status,
/// created_at, execution_at)`. Enum columns are stored as their canonical
/// string representations and converted at the repository boundary, so
/// this entity carries no dependency on the dispatch core's enum types.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "type")]
    pub job_type: String,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub priority: String,
    pub delay_seconds: i64,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub execution_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
