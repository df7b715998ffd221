use sea_orm::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::messages::{self, CreateMessage};

/// Insert a new message. Attachment metadata is stored verbatim; the file
/// itself lives behind `file_url`.
pub async fn insert_message(
    db: &DatabaseConnection,
    input: CreateMessage,
) -> Result<messages::Model, DbErr> {
    let (file_url, file_name, file_type) = match input.file {
        Some(f) => (Some(f.url), Some(f.name), Some(f.mime)),
        None => (None, None, None),
    };

    let new_message = messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(input.conversation_id),
        sender_id: Set(input.sender_id),
        content: Set(input.content),
        file_url: Set(file_url),
        file_name: Set(file_name),
        file_type: Set(file_type),
        created_at: Set(chrono::Utc::now()),
    };

    new_message.insert(db).await
}

/// Fetch messages for a conversation, newest first, with cursor pagination.
pub async fn get_messages_by_conversation(
    db: &DatabaseConnection,
    conversation_id: Uuid,
    limit: u64,
    cursor_created_at: Option<chrono::DateTime<chrono::Utc>>,
    cursor_id: Option<Uuid>,
) -> Result<Vec<messages::Model>, DbErr> {
    let mut query =
        messages::Entity::find().filter(messages::Column::ConversationId.eq(conversation_id));

    if let (Some(cursor_created_at), Some(cursor_id)) = (cursor_created_at, cursor_id) {
        query = query.filter(
            Condition::any()
                .add(messages::Column::CreatedAt.lt(cursor_created_at))
                .add(
                    Condition::all()
                        .add(messages::Column::CreatedAt.eq(cursor_created_at))
                        .add(messages::Column::Id.lt(cursor_id)),
                ),
        );
    }

    query
        .order_by_desc(messages::Column::CreatedAt)
        .order_by_desc(messages::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Get latest messages for many conversations in one query and return a
/// conversation_id -> message map.
pub async fn get_latest_messages_for_conversations(
    db: &DatabaseConnection,
    conversation_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, messages::Model>, DbErr> {
    if conversation_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = messages::Entity::find()
        .filter(messages::Column::ConversationId.is_in(conversation_ids))
        .order_by_asc(messages::Column::ConversationId)
        .order_by_desc(messages::Column::CreatedAt)
        .order_by_desc(messages::Column::Id)
        .all(db)
        .await?;

    let mut latest: HashMap<Uuid, messages::Model> = HashMap::new();
    let mut seen: HashSet<Uuid> = HashSet::new();

    for row in rows {
        if seen.insert(row.conversation_id) {
            latest.insert(row.conversation_id, row);
        }
    }

    Ok(latest)
}
