use actix_web::HttpResponse;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::conversations as conversation_db;
use crate::models::users::{Model as User, Roles};

/// Require the admin role.
pub fn require_admin(user: &User) -> Result<(), HttpResponse> {
    if user.role == Roles::Admin {
        Ok(())
    } else {
        Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Admin access required",
        })))
    }
}

/// Require that the caller acts on their own resource, or is an admin.
pub fn require_self_or_admin(user: &User, target_user_id: Uuid) -> Result<(), HttpResponse> {
    if user.id == target_user_id || user.role == Roles::Admin {
        Ok(())
    } else {
        Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only access your own data",
        })))
    }
}

/// Verify the user is a participant of the conversation. Membership is
/// checked against the database on every call.
pub async fn verify_conversation_participant(
    db: &DatabaseConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<(), HttpResponse> {
    match conversation_db::is_participant(db, conversation_id, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You are not a participant of this conversation",
        }))),
        Err(e) => Err(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn membership_count(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn non_participant_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![membership_count(0)]])
            .into_connection();

        let result =
            verify_conversation_participant(&db, Uuid::new_v4(), Uuid::new_v4()).await;

        let resp = result.expect_err("expected a rejection");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // Only the membership check ran; no other statement was issued.
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn participant_passes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![membership_count(1)]])
            .into_connection();

        let result =
            verify_conversation_participant(&db, Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(result.is_ok());
    }
}
