use sea_orm::prelude::Expr;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::unread_messages as unread;

/// Increment the unread counter for one (conversation, user), creating the
/// row at 1 if it does not exist yet.
///
/// Update-then-insert: if two senders race past the update and both insert,
/// the unique (conversation_id, user_id) index rejects one and a single
/// retry of the update picks up the winner's row.
pub async fn increment_unread(
    db: &DatabaseConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<(), DbErr> {
    let updated = unread::Entity::update_many()
        .col_expr(unread::Column::Count, Expr::col(unread::Column::Count).add(1))
        .filter(unread::Column::ConversationId.eq(conversation_id))
        .filter(unread::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if updated.rows_affected > 0 {
        return Ok(());
    }

    let insert = unread::ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(conversation_id),
        user_id: Set(user_id),
        count: Set(1),
    }
    .insert(db)
    .await;

    match insert {
        Ok(_) => Ok(()),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            unread::Entity::update_many()
                .col_expr(unread::Column::Count, Expr::col(unread::Column::Count).add(1))
                .filter(unread::Column::ConversationId.eq(conversation_id))
                .filter(unread::Column::UserId.eq(user_id))
                .exec(db)
                .await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Increment the counter for every participant except the sender.
pub async fn increment_unread_for_others(
    db: &DatabaseConnection,
    conversation_id: Uuid,
    participant_ids: &[Uuid],
    sender_id: Uuid,
) -> Result<(), DbErr> {
    for user_id in participant_ids {
        if *user_id == sender_id {
            continue;
        }
        increment_unread(db, conversation_id, *user_id).await?;
    }
    Ok(())
}

/// Unread counts for many conversations in one query, as a
/// conversation_id -> count map.
pub async fn counts_for_conversations(
    db: &DatabaseConnection,
    conversation_ids: Vec<Uuid>,
    user_id: Uuid,
) -> Result<HashMap<Uuid, i32>, DbErr> {
    if conversation_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = unread::Entity::find()
        .filter(unread::Column::ConversationId.is_in(conversation_ids))
        .filter(unread::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.conversation_id, r.count))
        .collect())
}

/// Mark a conversation read: delete every unread row for (conversation,
/// user). A blunt reset, not a per-message cursor.
pub async fn clear_unread(
    db: &DatabaseConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<u64, DbErr> {
    let result = unread::Entity::delete_many()
        .filter(unread::Column::ConversationId.eq(conversation_id))
        .filter(unread::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn counter_row(conversation_id: Uuid, user_id: Uuid, count: i32) -> unread::Model {
        unread::Model {
            id: Uuid::new_v4(),
            conversation_id,
            user_id,
            count,
        }
    }

    #[tokio::test]
    async fn increment_updates_an_existing_counter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        increment_unread(&db, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        // A single update, no insert issued.
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn increment_inserts_at_one_when_no_row_exists() {
        let conversation_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![counter_row(conversation_id, user_id, 1)]])
            .into_connection();

        increment_unread(&db, conversation_id, user_id)
            .await
            .unwrap();

        // The update missed, so a row was inserted at count 1.
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn increment_for_others_skips_the_sender() {
        let sender = Uuid::new_v4();
        let participants = vec![sender, Uuid::new_v4(), Uuid::new_v4()];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        increment_unread_for_others(&db, Uuid::new_v4(), &participants, sender)
            .await
            .unwrap();

        // One update per non-sender participant, nothing for the sender.
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn clear_reports_how_many_rows_were_deleted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let removed = clear_unread(&db, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(removed, 1);
    }
}
