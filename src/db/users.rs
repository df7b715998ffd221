use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, Roles, UpdateUser};
use crate::models::{admins, students, teachers};

/// Input for `register_user`, built by the auth handler after hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role: Roles,
}

/// Insert a user together with its role profile row in one transaction.
pub async fn register_user(
    db: &DatabaseConnection,
    input: NewUser,
) -> Result<users::Model, DbErr> {
    let txn = db.begin().await?;

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(input.email),
        password_hash: Set(input.password_hash),
        display_name: Set(input.display_name),
        avatar_url: Set(None),
        role: Set(input.role),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    }
    .insert(&txn)
    .await?;

    match user.role {
        Roles::Student => {
            students::ActiveModel {
                user_id: Set(user.id),
                level: Set(None),
                native_language: Set(None),
            }
            .insert(&txn)
            .await?;
        }
        Roles::Teacher => {
            teachers::ActiveModel {
                user_id: Set(user.id),
                bio: Set(None),
                languages: Set(None),
                photo_url: Set(None),
                is_published: Set(false),
            }
            .insert(&txn)
            .await?;
        }
        Roles::Admin => {
            admins::ActiveModel {
                user_id: Set(user.id),
                created_at: Set(chrono::Utc::now()),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    Ok(user)
}

/// Fetch a user by email (login path).
pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await
}

/// Fetch all users.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find().all(db).await
}

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Fetch several users at once, for embedding participant info.
pub async fn get_users_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<Vec<users::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await
}

/// Update an existing user (self-service or admin-level).
pub async fn update_user(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateUser,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(email) = input.email {
        active.email = Set(email);
    }
    if let Some(display_name) = input.display_name {
        active.display_name = Set(Some(display_name));
    }
    if let Some(avatar_url) = input.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }
    if let Some(role) = input.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Replace a user's password hash (reset flow).
pub async fn set_password_hash(
    db: &DatabaseConnection,
    id: Uuid,
    password_hash: String,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Delete a user by ID.
pub async fn delete_user(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    users::Entity::delete_by_id(id).exec(db).await
}
