use actix_web::{HttpResponse, Responder, web};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sea_orm::{DatabaseConnection, SqlErr};
use serde_json::json;

use crate::auth::middleware::{AuthenticatedUser, JwtSecret};
use crate::auth::{jwt, password};
use crate::db::users as user_db;
use crate::db::{password_resets, users::NewUser};
use crate::models::password_reset_tokens::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::models::users::{AuthResponse, LoginRequest, RegisterUser, Roles, UserResponse};

const MIN_PASSWORD_LEN: usize = 8;

/// Schema-level field checks, returned as a field -> message object.
fn validate_registration(body: &RegisterUser) -> serde_json::Map<String, serde_json::Value> {
    let mut errors = serde_json::Map::new();
    if !body.email.contains('@') {
        errors.insert("email".into(), json!("Must be a valid email address"));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        errors.insert(
            "password".into(),
            json!(format!("Must be at least {MIN_PASSWORD_LEN} characters")),
        );
    }
    if body.role == Some(Roles::Admin) {
        errors.insert("role".into(), json!("Admin accounts cannot self-register"));
    }
    errors
}

/// POST /api/auth/register — create a student or teacher account.
pub async fn register(
    db: web::Data<DatabaseConnection>,
    secret: web::Data<JwtSecret>,
    body: web::Json<RegisterUser>,
) -> impl Responder {
    let body = body.into_inner();

    let errors = validate_registration(&body);
    if !errors.is_empty() {
        return HttpResponse::UnprocessableEntity().json(json!({ "errors": errors }));
    }

    let password_hash = match password::hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Password hashing failed: {e}");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Registration failed",
            }));
        }
    };

    let input = NewUser {
        email: body.email,
        password_hash,
        display_name: body.display_name,
        role: body.role.unwrap_or(Roles::Student),
    };

    match user_db::register_user(db.get_ref(), input).await {
        Ok(user) => match jwt::issue_token(&user, &secret.0) {
            Ok(token) => HttpResponse::Created().json(AuthResponse {
                token,
                user: UserResponse::from(user),
            }),
            Err(e) => {
                tracing::error!("Token issuance failed: {e}");
                HttpResponse::InternalServerError().json(json!({
                    "error": "Registration failed",
                }))
            }
        },
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            HttpResponse::Conflict().json(json!({
                "error": "An account with this email already exists",
            }))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// POST /api/auth/login — verify credentials and mint a JWT.
///
/// Failures are deliberately indistinguishable: a wrong password and an
/// unknown email produce the same 401 body.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    secret: web::Data<JwtSecret>,
    body: web::Json<LoginRequest>,
) -> impl Responder {
    let body = body.into_inner();

    let user = match user_db::get_user_by_email(db.get_ref(), &body.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid email or password",
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    match password::verify_password(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid email or password",
            }));
        }
        Err(e) => {
            tracing::error!("Stored hash for user {} is unreadable: {e}", user.id);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Login failed",
            }));
        }
    }

    match jwt::issue_token(&user, &secret.0) {
        Ok(token) => HttpResponse::Ok().json(AuthResponse {
            token,
            user: UserResponse::from(user),
        }),
        Err(e) => {
            tracing::error!("Token issuance failed: {e}");
            HttpResponse::InternalServerError().json(json!({
                "error": "Login failed",
            }))
        }
    }
}

/// GET /api/auth/me — return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

/// POST /api/auth/forgot-password — issue a reset token.
///
/// Always answers 200 so the endpoint cannot be used to probe for accounts.
/// Mail delivery is out of scope; the token is written to the server log.
pub async fn forgot_password(
    db: web::Data<DatabaseConnection>,
    body: web::Json<ForgotPasswordRequest>,
) -> impl Responder {
    let email = body.into_inner().email;

    if let Ok(Some(user)) = user_db::get_user_by_email(db.get_ref(), &email).await {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        match password_resets::create_token(db.get_ref(), user.id, token.clone()).await {
            Ok(_) => tracing::info!("Password reset token for {}: {token}", user.email),
            Err(e) => tracing::error!("Failed to store reset token: {e}"),
        }
    }

    HttpResponse::Ok().json(json!({
        "message": "If that email is registered, a reset link has been sent",
    }))
}

/// POST /api/auth/reset-password — consume a token and set a new password.
pub async fn reset_password(
    db: web::Data<DatabaseConnection>,
    body: web::Json<ResetPasswordRequest>,
) -> impl Responder {
    let body = body.into_inner();

    if body.password.len() < MIN_PASSWORD_LEN {
        return HttpResponse::UnprocessableEntity().json(json!({
            "errors": { "password": format!("Must be at least {MIN_PASSWORD_LEN} characters") },
        }));
    }

    let token = match password_resets::find_valid_token(db.get_ref(), &body.token).await {
        Ok(Some(t)) => t,
        Ok(None) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid or expired reset token",
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    let password_hash = match password::hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Password hashing failed: {e}");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Password reset failed",
            }));
        }
    };

    if let Err(e) = user_db::set_password_hash(db.get_ref(), token.user_id, password_hash).await {
        return HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to update password: {e}"),
        }));
    }

    if let Err(e) = password_resets::mark_used(db.get_ref(), token.id).await {
        // The password is already changed; the stale token only risks replay
        // until it expires. Log and keep going.
        tracing::error!("Failed to mark reset token used: {e}");
    }

    HttpResponse::Ok().json(json!({
        "message": "Password updated",
    }))
}
