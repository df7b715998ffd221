use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::db::courses as course_db;
use crate::models::courses::{self, CourseQuery, CreateCourse, UpdateCourse};

/// GET /api/courses — public catalog of published courses, cached.
pub async fn get_courses(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    config: web::Data<CacheConfig>,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let key = keys::course_list(query.language.as_deref(), query.level.as_deref());

    if let Ok(Some(cached)) = cache.get::<Vec<courses::Model>>(&key).await {
        return HttpResponse::Ok().json(cached);
    }

    match course_db::get_published_courses(db.get_ref(), query.language, query.level).await {
        Ok(list) => {
            if let Err(e) = cache.set(&key, &list, config.course_ttl).await {
                tracing::warn!("Cache write failed for {key}: {e}");
            }
            HttpResponse::Ok().json(list)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// GET /api/courses/{slug} — public course detail, cached.
pub async fn get_course(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    config: web::Data<CacheConfig>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();
    let key = keys::course(&slug);

    if let Ok(Some(cached)) = cache.get::<courses::Model>(&key).await {
        return HttpResponse::Ok().json(cached);
    }

    match course_db::get_course_by_slug(db.get_ref(), &slug).await {
        Ok(Some(course)) if course.is_published => {
            if let Err(e) = cache.set(&key, &course, config.course_ttl).await {
                tracing::warn!("Cache write failed for {key}: {e}");
            }
            HttpResponse::Ok().json(course)
        }
        Ok(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Course '{slug}' not found"),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// GET /api/courses/all — admin listing including unpublished courses.
pub async fn get_all_courses(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match course_db::get_all_courses(db.get_ref()).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// POST /api/courses — admin create.
pub async fn create_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    body: web::Json<CreateCourse>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match course_db::insert_course(db.get_ref(), body.into_inner()).await {
        Ok(course) => {
            invalidate_courses(&cache).await;
            HttpResponse::Created().json(course)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create course: {e}"),
        })),
    }
}

/// PUT /api/courses/{id} — admin update.
pub async fn update_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCourse>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let id = path.into_inner();
    match course_db::update_course(db.get_ref(), id, body.into_inner()).await {
        Ok(updated) => {
            invalidate_courses(&cache).await;
            HttpResponse::Ok().json(updated)
        }
        Err(e) => {
            let mut status = if e.to_string().contains("not found") {
                HttpResponse::NotFound()
            } else {
                HttpResponse::InternalServerError()
            };
            status.json(serde_json::json!({
                "error": format!("Failed to update course: {e}"),
            }))
        }
    }
}

/// DELETE /api/courses/{id} — admin delete.
pub async fn delete_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let id = path.into_inner();
    match course_db::delete_course(db.get_ref(), id).await {
        Ok(result) => {
            if result.rows_affected > 0 {
                invalidate_courses(&cache).await;
                HttpResponse::Ok().json(serde_json::json!({
                    "message": format!("Course {id} deleted"),
                }))
            } else {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("Course {id} not found"),
                }))
            }
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete course: {e}"),
        })),
    }
}

async fn invalidate_courses(cache: &CacheData) {
    if let Err(e) = cache.delete_pattern("courses:*").await {
        tracing::warn!("Course cache invalidation failed: {e}");
    }
}
