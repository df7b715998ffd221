use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `courses` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub language: String,
    /// CEFR level the course targets, e.g. "B1".
    pub level: String,
    pub price_cents: i64,
    pub is_published: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classes::Entity")]
    Classes,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub language: String,
    pub level: String,
    pub price_cents: i64,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub price_cents: Option<i64>,
    pub is_published: Option<bool>,
}

/// Query parameters for the public course catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseQuery {
    pub language: Option<String>,
    pub level: Option<String>,
}
