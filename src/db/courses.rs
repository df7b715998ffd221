use sea_orm::*;
use uuid::Uuid;

use crate::models::courses::{self, CreateCourse, UpdateCourse};

/// Published courses for the public catalog, optionally filtered by
/// language and level.
pub async fn get_published_courses(
    db: &DatabaseConnection,
    language: Option<String>,
    level: Option<String>,
) -> Result<Vec<courses::Model>, DbErr> {
    let mut query = courses::Entity::find().filter(courses::Column::IsPublished.eq(true));

    if let Some(language) = language {
        query = query.filter(courses::Column::Language.eq(language));
    }
    if let Some(level) = level {
        query = query.filter(courses::Column::Level.eq(level));
    }

    query.order_by_asc(courses::Column::Title).all(db).await
}

/// Fetch every course, published or not (admin view).
pub async fn get_all_courses(db: &DatabaseConnection) -> Result<Vec<courses::Model>, DbErr> {
    courses::Entity::find()
        .order_by_asc(courses::Column::Title)
        .all(db)
        .await
}

pub async fn get_course_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<courses::Model>, DbErr> {
    courses::Entity::find_by_id(id).one(db).await
}

pub async fn get_course_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<courses::Model>, DbErr> {
    courses::Entity::find()
        .filter(courses::Column::Slug.eq(slug))
        .one(db)
        .await
}

pub async fn insert_course(
    db: &DatabaseConnection,
    input: CreateCourse,
) -> Result<courses::Model, DbErr> {
    courses::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        slug: Set(input.slug),
        description: Set(input.description),
        language: Set(input.language),
        level: Set(input.level),
        price_cents: Set(input.price_cents),
        is_published: Set(input.is_published.unwrap_or(false)),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
}

pub async fn update_course(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCourse,
) -> Result<courses::Model, DbErr> {
    let course = courses::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Course not found".to_string()))?;

    let mut active: courses::ActiveModel = course.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(slug) = input.slug {
        active.slug = Set(slug);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(language) = input.language {
        active.language = Set(language);
    }
    if let Some(level) = input.level {
        active.level = Set(level);
    }
    if let Some(price_cents) = input.price_cents {
        active.price_cents = Set(price_cents);
    }
    if let Some(is_published) = input.is_published {
        active.is_published = Set(is_published);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

pub async fn delete_course(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    courses::Entity::delete_by_id(id).exec(db).await
}
