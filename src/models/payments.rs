use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A recorded payment against an enrollment. Append-only bookkeeping;
/// there is no settlement or reconciliation behind it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub amount_cents: i64,
    /// ISO 4217 code, e.g. "EUR".
    pub currency: String,
    /// Free-form method label: "card", "cash", "transfer".
    pub method: String,
    /// External reference (bank transfer id, receipt number).
    pub reference: Option<String>,
    pub paid_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollments::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollments::Column::Id"
    )]
    Enrollment,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub enrollment_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub method: String,
    pub reference: Option<String>,
    /// Defaults to now when omitted.
    pub paid_at: Option<DateTimeUtc>,
}
