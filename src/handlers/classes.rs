use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::db::classes as class_db;
use crate::db::courses as course_db;
use crate::models::classes::{CreateClass, ScheduleQuery, UpdateClass};

/// GET /api/classes — public schedule listing. Grouping by day is the
/// client's job; the server just filters and sorts.
pub async fn get_schedule(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ScheduleQuery>,
) -> impl Responder {
    match class_db::get_schedule(db.get_ref(), query.into_inner()).await {
        Ok(classes) => HttpResponse::Ok().json(classes),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// GET /api/classes/{id} — public class detail.
pub async fn get_class(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    match class_db::get_class_by_id(db.get_ref(), id).await {
        Ok(Some(class)) => HttpResponse::Ok().json(class),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Class {id} not found"),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// POST /api/classes — admin create. The referenced course must exist.
pub async fn create_class(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateClass>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let body = body.into_inner();

    if body.ends_at <= body.starts_at {
        return HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "errors": { "ends_at": "Must be after starts_at" },
        }));
    }

    match course_db::get_course_by_id(db.get_ref(), body.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Course {} not found", body.course_id),
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }));
        }
    }

    match class_db::insert_class(db.get_ref(), body).await {
        Ok(class) => HttpResponse::Created().json(class),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create class: {e}"),
        })),
    }
}

/// PUT /api/classes/{id} — admin update.
pub async fn update_class(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateClass>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let id = path.into_inner();
    match class_db::update_class(db.get_ref(), id, body.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => {
            let mut status = if e.to_string().contains("not found") {
                HttpResponse::NotFound()
            } else {
                HttpResponse::InternalServerError()
            };
            status.json(serde_json::json!({
                "error": format!("Failed to update class: {e}"),
            }))
        }
    }
}

/// DELETE /api/classes/{id} — admin delete.
pub async fn delete_class(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let id = path.into_inner();
    match class_db::delete_class(db.get_ref(), id).await {
        Ok(result) => {
            if result.rows_affected > 0 {
                HttpResponse::Ok().json(serde_json::json!({
                    "message": format!("Class {id} deleted"),
                }))
            } else {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("Class {id} not found"),
                }))
            }
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete class: {e}"),
        })),
    }
}
