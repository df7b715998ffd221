use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::db::enrollments as enrollment_db;
use crate::db::payments as payment_db;
use crate::models::enrollments::Status;
use crate::models::payments::CreatePayment;
use crate::models::users::Roles;

/// POST /api/payments — admin records a payment against an enrollment.
///
/// Recording a payment for a pending enrollment activates it. That is the
/// extent of the "settlement logic".
pub async fn create_payment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreatePayment>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let body = body.into_inner();

    if body.amount_cents <= 0 {
        return HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "errors": { "amount_cents": "Must be a positive amount" },
        }));
    }

    let enrollment =
        match enrollment_db::get_enrollment_by_id(db.get_ref(), body.enrollment_id).await {
            Ok(Some(e)) => e,
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("Enrollment {} not found", body.enrollment_id),
                }));
            }
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Database error: {e}"),
                }));
            }
        };

    if enrollment.status == Status::Cancelled {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Cannot record a payment against a cancelled enrollment",
        }));
    }

    let payment = match payment_db::insert_payment(db.get_ref(), body).await {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to record payment: {e}"),
            }));
        }
    };

    if enrollment.status == Status::Pending {
        if let Err(e) =
            enrollment_db::update_enrollment_status(db.get_ref(), enrollment.id, Status::Active)
                .await
        {
            // The payment row exists either way; activation can be redone by
            // hand from the admin screen.
            tracing::error!("Failed to activate enrollment {}: {e}", enrollment.id);
        }
    }

    HttpResponse::Created().json(payment)
}

/// GET /api/payments/enrollment/{id} — payments for one enrollment, visible
/// to admins and to the enrolled student.
pub async fn get_payments_by_enrollment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let enrollment_id = path.into_inner();

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

    if user.0.role != Roles::Admin && enrollment.student_id != user.0.id {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only view payments for your own enrollments",
        }));
    }

    match payment_db::get_payments_by_enrollment(db.get_ref(), enrollment_id).await {
        Ok(payments) => HttpResponse::Ok().json(payments),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}
