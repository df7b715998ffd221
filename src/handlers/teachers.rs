use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::db::teachers as teacher_db;
use crate::models::teachers::{TeacherDirectoryEntry, UpdateTeacherProfile};
use crate::models::users::Roles;

/// GET /api/teachers — public directory of published teacher profiles,
/// cached.
pub async fn get_teachers(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    config: web::Data<CacheConfig>,
) -> impl Responder {
    let key = keys::teacher_directory();

    if let Ok(Some(cached)) = cache.get::<Vec<TeacherDirectoryEntry>>(&key).await {
        return HttpResponse::Ok().json(cached);
    }

    match teacher_db::get_published_profiles(db.get_ref()).await {
        Ok(entries) => {
            if let Err(e) = cache.set(&key, &entries, config.teacher_ttl).await {
                tracing::warn!("Cache write failed for {key}: {e}");
            }
            HttpResponse::Ok().json(entries)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// PUT /api/teachers/me — a teacher updates their own profile.
pub async fn update_own_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    body: web::Json<UpdateTeacherProfile>,
) -> impl Responder {
    if user.0.role != Roles::Teacher {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only teachers have a teacher profile",
        }));
    }

    match teacher_db::update_profile(db.get_ref(), user.0.id, body.into_inner()).await {
        Ok(profile) => {
            invalidate_directory(&cache).await;
            HttpResponse::Ok().json(profile)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update profile: {e}"),
        })),
    }
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub is_published: bool,
}

/// PUT /api/teachers/{user_id}/publish — admin toggles directory visibility.
pub async fn set_published(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<PublishRequest>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let user_id = path.into_inner();
    match teacher_db::set_published(db.get_ref(), user_id, body.is_published).await {
        Ok(profile) => {
            invalidate_directory(&cache).await;
            HttpResponse::Ok().json(profile)
        }
        Err(e) => {
            let mut status = if e.to_string().contains("not found") {
                HttpResponse::NotFound()
            } else {
                HttpResponse::InternalServerError()
            };
            status.json(serde_json::json!({
                "error": format!("Failed to update teacher profile: {e}"),
            }))
        }
    }
}

async fn invalidate_directory(cache: &CacheData) {
    if let Err(e) = cache.delete_pattern("teachers:*").await {
        tracing::warn!("Teacher cache invalidation failed: {e}");
    }
}
