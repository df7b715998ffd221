use sea_orm::*;
use uuid::Uuid;

use crate::models::password_reset_tokens as tokens;

/// Token lifetime: one hour.
const TOKEN_TTL_SECS: i64 = 3600;

/// Create a reset token row for a user and return it.
pub async fn create_token(
    db: &DatabaseConnection,
    user_id: Uuid,
    token: String,
) -> Result<tokens::Model, DbErr> {
    let now = chrono::Utc::now();
    tokens::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token: Set(token),
        expires_at: Set(now + chrono::Duration::seconds(TOKEN_TTL_SECS)),
        used_at: Set(None),
        created_at: Set(now),
    }
    .insert(db)
    .await
}

/// Find an unexpired, unused token by its value.
pub async fn find_valid_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<tokens::Model>, DbErr> {
    tokens::Entity::find()
        .filter(tokens::Column::Token.eq(token))
        .filter(tokens::Column::UsedAt.is_null())
        .filter(tokens::Column::ExpiresAt.gt(chrono::Utc::now()))
        .one(db)
        .await
}

/// Consume a token so it cannot be replayed.
pub async fn mark_used(db: &DatabaseConnection, id: Uuid) -> Result<tokens::Model, DbErr> {
    let token = tokens::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Reset token not found".to_string()))?;

    let mut active: tokens::ActiveModel = token.into();
    active.used_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
