use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::db::posts as post_db;
use crate::models::posts::{self, CreatePost, PostQuery, UpdatePost};

/// GET /api/posts — public blog listing, newest first, cached.
pub async fn get_posts(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    config: web::Data<CacheConfig>,
    query: web::Query<PostQuery>,
) -> impl Responder {
    let category = query.into_inner().category;
    let key = keys::post_list(category.as_deref());

    if let Ok(Some(cached)) = cache.get::<Vec<posts::Model>>(&key).await {
        return HttpResponse::Ok().json(cached);
    }

    match post_db::get_published_posts(db.get_ref(), category).await {
        Ok(list) => {
            if let Err(e) = cache.set(&key, &list, config.post_ttl).await {
                tracing::warn!("Cache write failed for {key}: {e}");
            }
            HttpResponse::Ok().json(list)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// GET /api/posts/{slug} — public post detail, cached.
pub async fn get_post(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    config: web::Data<CacheConfig>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();
    let key = keys::post(&slug);

    if let Ok(Some(cached)) = cache.get::<posts::Model>(&key).await {
        return HttpResponse::Ok().json(cached);
    }

    match post_db::get_post_by_slug(db.get_ref(), &slug).await {
        Ok(Some(post)) if post.is_published => {
            if let Err(e) = cache.set(&key, &post, config.post_ttl).await {
                tracing::warn!("Cache write failed for {key}: {e}");
            }
            HttpResponse::Ok().json(post)
        }
        Ok(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Post '{slug}' not found"),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// POST /api/posts — admin create. The author is the caller.
pub async fn create_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    body: web::Json<CreatePost>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match post_db::insert_post(db.get_ref(), body.into_inner(), user.0.id).await {
        Ok(post) => {
            invalidate_posts(&cache).await;
            HttpResponse::Created().json(post)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create post: {e}"),
        })),
    }
}

/// PUT /api/posts/{id} — admin update.
pub async fn update_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePost>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let id = path.into_inner();
    match post_db::update_post(db.get_ref(), id, body.into_inner()).await {
        Ok(updated) => {
            invalidate_posts(&cache).await;
            HttpResponse::Ok().json(updated)
        }
        Err(e) => {
            let mut status = if e.to_string().contains("not found") {
                HttpResponse::NotFound()
            } else {
                HttpResponse::InternalServerError()
            };
            status.json(serde_json::json!({
                "error": format!("Failed to update post: {e}"),
            }))
        }
    }
}

/// DELETE /api/posts/{id} — admin delete.
pub async fn delete_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let id = path.into_inner();
    match post_db::delete_post(db.get_ref(), id).await {
        Ok(result) => {
            if result.rows_affected > 0 {
                invalidate_posts(&cache).await;
                HttpResponse::Ok().json(serde_json::json!({
                    "message": format!("Post {id} deleted"),
                }))
            } else {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("Post {id} not found"),
                }))
            }
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete post: {e}"),
        })),
    }
}

async fn invalidate_posts(cache: &CacheData) {
    if let Err(e) = cache.delete_pattern("posts:*").await {
        tracing::warn!("Post cache invalidation failed: {e}");
    }
}
