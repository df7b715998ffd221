use sea_orm::*;
use uuid::Uuid;

use crate::models::payments::{self, CreatePayment};

/// Record a payment against an enrollment.
pub async fn insert_payment(
    db: &DatabaseConnection,
    input: CreatePayment,
) -> Result<payments::Model, DbErr> {
    let now = chrono::Utc::now();
    payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        enrollment_id: Set(input.enrollment_id),
        amount_cents: Set(input.amount_cents),
        currency: Set(input.currency),
        method: Set(input.method),
        reference: Set(input.reference),
        paid_at: Set(input.paid_at.unwrap_or(now)),
        created_at: Set(now),
    }
    .insert(db)
    .await
}

/// All payments recorded for one enrollment, oldest first.
pub async fn get_payments_by_enrollment(
    db: &DatabaseConnection,
    enrollment_id: Uuid,
) -> Result<Vec<payments::Model>, DbErr> {
    payments::Entity::find()
        .filter(payments::Column::EnrollmentId.eq(enrollment_id))
        .order_by_asc(payments::Column::PaidAt)
        .all(db)
        .await
}
