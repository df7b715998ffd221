use sea_orm::*;
use uuid::Uuid;

use crate::models::contact_messages::{self, ContactRequest};
use crate::models::newsletter_subscribers as subscribers;

/// Store a contact form submission.
pub async fn insert_contact_message(
    db: &DatabaseConnection,
    input: ContactRequest,
) -> Result<contact_messages::Model, DbErr> {
    contact_messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        email: Set(input.email),
        subject: Set(input.subject),
        body: Set(input.body),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
}

/// Subscribe an email to the newsletter. Idempotent: a duplicate email is
/// treated as already subscribed, not as an error.
pub async fn subscribe(db: &DatabaseConnection, email: String) -> Result<(), DbErr> {
    let insert = subscribers::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await;

    match insert {
        Ok(_) => Ok(()),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(()),
        Err(e) => Err(e),
    }
}
