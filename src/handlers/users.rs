use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::{require_admin, require_self_or_admin};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::users as user_db;
use crate::models::users::{Roles, UpdateUser, UserResponse};

/// GET /api/users — admin-only user listing.
pub async fn get_users(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match user_db::get_all_users(db.get_ref()).await {
        Ok(users) => {
            let response: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// GET /api/users/{id} — own profile, or any profile for admins.
pub async fn get_user(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    if let Err(resp) = require_self_or_admin(&user.0, id) {
        return resp;
    }

    match user_db::get_user_by_id(db.get_ref(), id).await {
        Ok(Some(u)) => HttpResponse::Ok().json(UserResponse::from(u)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("User {id} not found"),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// PUT /api/users/{id} — self-service profile update; role changes are
/// admin-only.
pub async fn update_user(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUser>,
) -> impl Responder {
    let id = path.into_inner();
    let body = body.into_inner();

    if let Err(resp) = require_self_or_admin(&user.0, id) {
        return resp;
    }

    if body.role.is_some() && user.0.role != Roles::Admin {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only admins can change roles",
        }));
    }

    match user_db::update_user(db.get_ref(), id, body).await {
        Ok(updated) => HttpResponse::Ok().json(UserResponse::from(updated)),
        Err(e) => {
            let mut status = if e.to_string().contains("not found") {
                HttpResponse::NotFound()
            } else {
                HttpResponse::InternalServerError()
            };
            status.json(serde_json::json!({
                "error": format!("Failed to update user: {e}"),
            }))
        }
    }
}

/// DELETE /api/users/{id} — admin-only.
pub async fn delete_user(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match user_db::delete_user(db.get_ref(), id).await {
        Ok(result) => {
            if result.rows_affected > 0 {
                HttpResponse::Ok().json(serde_json::json!({
                    "message": format!("User {id} deleted"),
                }))
            } else {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("User {id} not found"),
                }))
            }
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete user: {e}"),
        })),
    }
}
