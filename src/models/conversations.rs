use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `conversations` table.
///
/// Direct (two-party) conversations carry a `direct_key` — the normalized
/// unordered pair of participant ids. A unique index on that column is what
/// guarantees at most one direct conversation per pair of users, even when
/// both sides fire their first message at the same time. Group conversations
/// leave it NULL.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub is_group: bool,
    /// Group name; NULL for direct conversations.
    pub name: Option<String>,
    #[sea_orm(unique, nullable)]
    pub direct_key: Option<String>,
    pub created_at: DateTimeUtc,
    /// Bumped on every message; drives conversation-list ordering.
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Normalized key for a direct conversation between two users.
///
/// Order-insensitive: `direct_key(a, b) == direct_key(b, a)`.
pub fn direct_key(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}:{hi}")
}

// ── DTOs ──

/// Body for POST /api/chat/conversations. The sender comes from the JWT and
/// must not be listed in `participant_ids`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConversation {
    pub participant_ids: Vec<Uuid>,
    pub content: String,
    #[serde(default)]
    pub is_group: bool,
    pub name: Option<String>,
}

/// One entry of GET /api/chat/conversations.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub is_group: bool,
    pub name: Option<String>,
    pub participants: Vec<ParticipantInfo>,
    pub last_message: Option<super::messages::MessageResponse>,
    pub unread_count: i32,
    pub updated_at: DateTimeUtc,
}

/// Minimal participant info embedded in conversation payloads.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantInfo {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_is_order_insensitive() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(direct_key(a, b), direct_key(b, a));
    }

    #[test]
    fn direct_key_puts_smaller_uuid_first() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("ffffffff-ffff-ffff-ffff-ffffffffffff").unwrap();
        let key = direct_key(b, a);
        assert!(key.starts_with(&a.to_string()));
        assert!(key.ends_with(&b.to_string()));
    }
}
