use sea_orm::*;
use uuid::Uuid;

use crate::models::teachers::{self, TeacherDirectoryEntry, UpdateTeacherProfile};
use crate::models::users;

/// Published teacher profiles joined with the user's display fields, for
/// the public directory.
pub async fn get_published_profiles(
    db: &DatabaseConnection,
) -> Result<Vec<TeacherDirectoryEntry>, DbErr> {
    let rows = teachers::Entity::find()
        .filter(teachers::Column::IsPublished.eq(true))
        .find_also_related(users::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(profile, user)| TeacherDirectoryEntry {
            user_id: profile.user_id,
            display_name: user.as_ref().and_then(|u| u.display_name.clone()),
            avatar_url: user.as_ref().and_then(|u| u.avatar_url.clone()),
            bio: profile.bio,
            languages: profile.languages,
            photo_url: profile.photo_url,
        })
        .collect())
}

/// A teacher updating their own profile fields.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: UpdateTeacherProfile,
) -> Result<teachers::Model, DbErr> {
    let profile = teachers::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Teacher profile not found".to_string()))?;

    let mut active: teachers::ActiveModel = profile.into();

    if let Some(bio) = input.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(languages) = input.languages {
        active.languages = Set(Some(languages));
    }
    if let Some(photo_url) = input.photo_url {
        active.photo_url = Set(Some(photo_url));
    }

    active.update(db).await
}

/// Admin publish/unpublish toggle for the public directory.
pub async fn set_published(
    db: &DatabaseConnection,
    user_id: Uuid,
    is_published: bool,
) -> Result<teachers::Model, DbErr> {
    let profile = teachers::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Teacher profile not found".to_string()))?;

    let mut active: teachers::ActiveModel = profile.into();
    active.is_published = Set(is_published);

    active.update(db).await
}
