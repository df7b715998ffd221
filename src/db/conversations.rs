use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::conversations::{self, direct_key};
use crate::models::{messages, participants, unread_messages};

/// Input for `create_conversation`: the sender plus every other participant.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub sender_id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub is_group: bool,
    pub name: Option<String>,
    pub content: String,
}

/// Look up an existing direct conversation between two users via the
/// normalized pair key.
pub async fn find_direct_conversation(
    db: &DatabaseConnection,
    a: Uuid,
    b: Uuid,
) -> Result<Option<conversations::Model>, DbErr> {
    conversations::Entity::find()
        .filter(conversations::Column::DirectKey.eq(direct_key(a, b)))
        .filter(conversations::Column::IsGroup.eq(false))
        .one(db)
        .await
}

/// Create a conversation, its participant rows, its first message and the
/// initial unread counters as a single transaction.
///
/// Direct conversations get a `direct_key`; the unique index on that column
/// makes a concurrent duplicate insert fail with a unique violation, which
/// the caller resolves by re-fetching the winner.
pub async fn create_conversation(
    db: &DatabaseConnection,
    input: NewConversation,
) -> Result<(conversations::Model, messages::Model), DbErr> {
    let now = chrono::Utc::now();

    let key = if !input.is_group && input.participant_ids.len() == 1 {
        Some(direct_key(input.sender_id, input.participant_ids[0]))
    } else {
        None
    };

    let txn = db.begin().await?;

    let conversation = conversations::ActiveModel {
        id: Set(Uuid::new_v4()),
        is_group: Set(input.is_group),
        name: Set(input.name),
        direct_key: Set(key),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    // The sender is a participant too.
    let mut member_ids = vec![input.sender_id];
    member_ids.extend(&input.participant_ids);

    for user_id in &member_ids {
        participants::ActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation.id),
            user_id: Set(*user_id),
        }
        .insert(&txn)
        .await?;
    }

    let first_message = messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(conversation.id),
        sender_id: Set(input.sender_id),
        content: Set(input.content),
        file_url: Set(None),
        file_name: Set(None),
        file_type: Set(None),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    // Everyone but the sender starts with one unread message.
    for user_id in &input.participant_ids {
        unread_messages::ActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation.id),
            user_id: Set(*user_id),
            count: Set(1),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok((conversation, first_message))
}

/// Fetch a single conversation by ID.
pub async fn get_conversation_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<conversations::Model>, DbErr> {
    conversations::Entity::find_by_id(id).one(db).await
}

/// All conversations the user participates in, most recently active first.
pub async fn get_conversations_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<conversations::Model>, DbErr> {
    conversations::Entity::find()
        .join(
            JoinType::InnerJoin,
            conversations::Relation::Participants.def(),
        )
        .filter(participants::Column::UserId.eq(user_id))
        .order_by_desc(conversations::Column::UpdatedAt)
        .all(db)
        .await
}

/// Participant rows for one conversation.
pub async fn get_participants(
    db: &DatabaseConnection,
    conversation_id: Uuid,
) -> Result<Vec<participants::Model>, DbErr> {
    participants::Entity::find()
        .filter(participants::Column::ConversationId.eq(conversation_id))
        .all(db)
        .await
}

/// Participant rows for many conversations in one query, grouped by
/// conversation id.
pub async fn get_participants_for_conversations(
    db: &DatabaseConnection,
    conversation_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<participants::Model>>, DbErr> {
    if conversation_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = participants::Entity::find()
        .filter(participants::Column::ConversationId.is_in(conversation_ids))
        .all(db)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<participants::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.conversation_id).or_default().push(row);
    }

    Ok(grouped)
}

/// Membership check for authorization. Always a live query, never a cached
/// set.
pub async fn is_participant(
    db: &DatabaseConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    let count = participants::Entity::find()
        .filter(participants::Column::ConversationId.eq(conversation_id))
        .filter(participants::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Bump `updated_at` so the conversation sorts to the top of the list.
pub async fn touch_conversation(
    db: &DatabaseConnection,
    conversation_id: Uuid,
) -> Result<(), DbErr> {
    conversations::Entity::update_many()
        .col_expr(
            conversations::Column::UpdatedAt,
            sea_orm::prelude::Expr::value(chrono::Utc::now()),
        )
        .filter(conversations::Column::Id.eq(conversation_id))
        .exec(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn direct_lookup_ignores_argument_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<conversations::Model>::new()])
            .into_connection();
        find_direct_conversation(&db, a, b).await.unwrap();
        let forward = db.into_transaction_log();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<conversations::Model>::new()])
            .into_connection();
        find_direct_conversation(&db, b, a).await.unwrap();
        let reverse = db.into_transaction_log();

        // Both orders query the same normalized pair key.
        assert_eq!(forward, reverse);
    }

    #[tokio::test]
    async fn direct_lookup_returns_the_existing_conversation() {
        let existing = conversations::Model {
            id: Uuid::new_v4(),
            is_group: false,
            name: None,
            direct_key: Some(direct_key(Uuid::new_v4(), Uuid::new_v4())),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .into_connection();

        let found = find_direct_conversation(&db, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(found, Some(existing));
    }
}
