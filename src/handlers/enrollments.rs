use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::db::classes as class_db;
use crate::db::enrollments as enrollment_db;
use crate::models::enrollments::{CreateEnrollment, Status, UpdateEnrollmentStatus};
use crate::models::users::Roles;

/// POST /api/enrollments — a student enrolls in a class.
///
/// The student id comes from the JWT. The class must exist, and a student
/// can hold at most one enrollment per class.
pub async fn create_enrollment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateEnrollment>,
) -> impl Responder {
    if user.0.role != Roles::Student {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only students can enroll in classes",
        }));
    }

    let class_id = body.class_id;
    let student_id = user.0.id;

    match class_db::get_class_by_id(db.get_ref(), class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Class {class_id} not found"),
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }));
        }
    }

    match enrollment_db::enrollment_exists(db.get_ref(), class_id, student_id).await {
        Ok(true) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "You are already enrolled in this class",
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }));
        }
        _ => {}
    }

    match enrollment_db::insert_enrollment(db.get_ref(), class_id, student_id).await {
        Ok(enrollment) => HttpResponse::Created().json(enrollment),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create enrollment: {e}"),
        })),
    }
}

/// GET /api/enrollments — enrollments relevant to the caller: own
/// enrollments for students, enrollments in taught classes for teachers,
/// everything for admins.
pub async fn get_enrollments(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> impl Responder {
    let result = match user.0.role {
        Roles::Student => enrollment_db::get_enrollments_by_student(db.get_ref(), user.0.id).await,
        Roles::Teacher => enrollment_db::get_enrollments_for_teacher(db.get_ref(), user.0.id).await,
        Roles::Admin => enrollment_db::get_all_enrollments(db.get_ref()).await,
    };

    match result {
        Ok(enrollments) => HttpResponse::Ok().json(enrollments),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// PUT /api/enrollments/{id}/status — admin moves a pending enrollment to
/// active or cancelled. No other transitions exist.
pub async fn update_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateEnrollmentStatus>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let enrollment_id = path.into_inner();
    let new_status = body.status;

    if new_status == Status::Pending {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "An enrollment cannot be moved back to pending",
        }));
    }

    let enrollment = match enrollment_db::get_enrollment_by_id(db.get_ref(), enrollment_id).await {
        Ok(Some(e)) => e,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Enrollment {enrollment_id} not found"),
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    if enrollment.status != Status::Pending {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!(
                "Enrollment is already {:?}. Only pending enrollments can be updated.",
                enrollment.status
            ),
        }));
    }

    match enrollment_db::update_enrollment_status(db.get_ref(), enrollment_id, new_status).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update enrollment: {e}"),
        })),
    }
}
