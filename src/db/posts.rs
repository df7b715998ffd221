use sea_orm::*;
use uuid::Uuid;

use crate::models::posts::{self, CreatePost, UpdatePost};

/// Published posts for the public blog, newest first, optionally filtered
/// by category.
pub async fn get_published_posts(
    db: &DatabaseConnection,
    category: Option<String>,
) -> Result<Vec<posts::Model>, DbErr> {
    let mut query = posts::Entity::find().filter(posts::Column::IsPublished.eq(true));

    if let Some(category) = category {
        query = query.filter(posts::Column::Category.eq(category));
    }

    query
        .order_by_desc(posts::Column::PublishedAt)
        .all(db)
        .await
}

pub async fn get_post_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<posts::Model>, DbErr> {
    posts::Entity::find()
        .filter(posts::Column::Slug.eq(slug))
        .one(db)
        .await
}

pub async fn insert_post(
    db: &DatabaseConnection,
    input: CreatePost,
    author_id: Uuid,
) -> Result<posts::Model, DbErr> {
    let now = chrono::Utc::now();
    let is_published = input.is_published.unwrap_or(false);

    posts::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        slug: Set(input.slug),
        body: Set(input.body),
        category: Set(input.category),
        author_id: Set(author_id),
        is_published: Set(is_published),
        published_at: Set(is_published.then_some(now)),
        created_at: Set(now),
        updated_at: Set(None),
    }
    .insert(db)
    .await
}

pub async fn update_post(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdatePost,
) -> Result<posts::Model, DbErr> {
    let post = posts::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Post not found".to_string()))?;

    let was_published = post.is_published;
    let mut active: posts::ActiveModel = post.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(slug) = input.slug {
        active.slug = Set(slug);
    }
    if let Some(body) = input.body {
        active.body = Set(body);
    }
    if let Some(category) = input.category {
        active.category = Set(Some(category));
    }
    if let Some(is_published) = input.is_published {
        active.is_published = Set(is_published);
        if is_published && !was_published {
            active.published_at = Set(Some(chrono::Utc::now()));
        }
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

pub async fn delete_post(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    posts::Entity::delete_by_id(id).exec(db).await
}
