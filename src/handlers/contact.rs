use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::db::contact as contact_db;
use crate::models::contact_messages::ContactRequest;
use crate::models::newsletter_subscribers::SubscribeRequest;

/// POST /api/contact — store a contact form submission.
pub async fn submit_contact(
    db: web::Data<DatabaseConnection>,
    body: web::Json<ContactRequest>,
) -> impl Responder {
    let body = body.into_inner();

    let mut errors = serde_json::Map::new();
    if body.name.trim().is_empty() {
        errors.insert("name".into(), json!("Name is required"));
    }
    if !body.email.contains('@') {
        errors.insert("email".into(), json!("Must be a valid email address"));
    }
    if body.body.trim().is_empty() {
        errors.insert("body".into(), json!("Message is required"));
    }
    if !errors.is_empty() {
        return HttpResponse::UnprocessableEntity().json(json!({ "errors": errors }));
    }

    match contact_db::insert_contact_message(db.get_ref(), body).await {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "Thanks! We'll get back to you soon.",
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to store message: {e}"),
        })),
    }
}

/// POST /api/newsletter — subscribe an email. Idempotent on duplicates.
pub async fn subscribe_newsletter(
    db: web::Data<DatabaseConnection>,
    body: web::Json<SubscribeRequest>,
) -> impl Responder {
    let email = body.into_inner().email;

    if !email.contains('@') {
        return HttpResponse::UnprocessableEntity().json(json!({
            "errors": { "email": "Must be a valid email address" },
        }));
    }

    match contact_db::subscribe(db.get_ref(), email).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "message": "Subscribed",
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to subscribe: {e}"),
        })),
    }
}
