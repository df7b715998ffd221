use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teacher profile shown on the public directory once published.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    /// Comma-separated list of taught languages, e.g. "Spanish,French".
    pub languages: Option<String>,
    pub photo_url: Option<String>,
    pub is_published: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Body for a teacher updating their own profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeacherProfile {
    pub bio: Option<String>,
    pub languages: Option<String>,
    pub photo_url: Option<String>,
}

/// Public directory entry: profile joined with the user's display fields.
/// Round-trips through the Redis cache, so it derives both serde halves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherDirectoryEntry {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub languages: Option<String>,
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_entry_survives_cache_round_trip() {
        let entry = TeacherDirectoryEntry {
            user_id: Uuid::new_v4(),
            display_name: Some("Ana Morales".to_string()),
            avatar_url: None,
            bio: Some("Spanish teacher".to_string()),
            languages: Some("Spanish,Catalan".to_string()),
            photo_url: None,
        };

        let json = serde_json::to_string(&vec![entry.clone()]).unwrap();
        let back: Vec<TeacherDirectoryEntry> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 1);
        assert_eq!(back[0].user_id, entry.user_id);
        assert_eq!(back[0].display_name, entry.display_name);
        assert_eq!(back[0].languages, entry.languages);
    }
}
