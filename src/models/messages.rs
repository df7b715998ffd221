use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `messages` table. Rows are append-only and
/// immutable once written; read state lives in `unread_messages`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::conversations::Entity",
        from = "Column::ConversationId",
        to = "super::conversations::Column::Id"
    )]
    Conversation,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,
}

impl Related<super::conversations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Optional attachment metadata on an outgoing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub url: String,
    pub name: String,
    pub mime: String,
}

/// DTO for creating a new message (used internally by the chat system).
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub file: Option<FileMeta>,
}

/// Body for POST /api/chat/conversations/{id}/messages.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub file: Option<FileMeta>,
}

/// Response DTO for messages sent over WebSocket and REST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Model> for MessageResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            content: m.content,
            file_url: m.file_url,
            file_name: m.file_name,
            file_type: m.file_type,
            created_at: m.created_at,
        }
    }
}

/// Cursor parameters for paginated message history.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageQuery {
    pub limit: Option<u64>,
    pub before: Option<chrono::DateTime<chrono::Utc>>,
    pub before_id: Option<Uuid>,
}
