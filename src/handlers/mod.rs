pub mod auth;
pub mod chat;
pub mod classes;
pub mod contact;
pub mod courses;
pub mod enrollments;
pub mod payments;
pub mod posts;
pub mod teachers;
pub mod users;

use actix_web::web;

use crate::chat::session;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (register/login/reset are public; /me needs a JWT) ──
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me))
            .route("/forgot-password", web::post().to(auth::forgot_password))
            .route("/reset-password", web::post().to(auth::reset_password)),
    );

    // ── Public catalog: courses, schedule, teachers, blog ──
    cfg.service(
        web::scope("/courses")
            .route("", web::get().to(courses::get_courses))
            .route("", web::post().to(courses::create_course))
            .route("/all", web::get().to(courses::get_all_courses))
            .route("/{slug}", web::get().to(courses::get_course))
            .route("/{id}", web::put().to(courses::update_course))
            .route("/{id}", web::delete().to(courses::delete_course)),
    );
    cfg.service(
        web::scope("/classes")
            .route("", web::get().to(classes::get_schedule))
            .route("", web::post().to(classes::create_class))
            .route("/{id}", web::get().to(classes::get_class))
            .route("/{id}", web::put().to(classes::update_class))
            .route("/{id}", web::delete().to(classes::delete_class)),
    );
    cfg.service(
        web::scope("/teachers")
            .route("", web::get().to(teachers::get_teachers))
            .route("/me", web::put().to(teachers::update_own_profile))
            .route("/{user_id}/publish", web::put().to(teachers::set_published)),
    );
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(posts::get_posts))
            .route("", web::post().to(posts::create_post))
            .route("/{slug}", web::get().to(posts::get_post))
            .route("/{id}", web::put().to(posts::update_post))
            .route("/{id}", web::delete().to(posts::delete_post)),
    );

    // ── Enrollment & payment (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/enrollments")
            .route("", web::get().to(enrollments::get_enrollments))
            .route("", web::post().to(enrollments::create_enrollment))
            .route("/{id}/status", web::put().to(enrollments::update_status)),
    );
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(payments::create_payment))
            .route(
                "/enrollment/{id}",
                web::get().to(payments::get_payments_by_enrollment),
            ),
    );

    // ── Messaging (all protected; the ws route authenticates via token
    //    query param) ──
    cfg.service(
        web::scope("/chat")
            .route("/conversations", web::get().to(chat::get_conversations))
            .route("/conversations", web::post().to(chat::create_conversation))
            .route(
                "/conversations/{id}/messages",
                web::get().to(chat::get_messages),
            )
            .route(
                "/conversations/{id}/messages",
                web::post().to(chat::send_message),
            )
            .route("/conversations/{id}/read", web::post().to(chat::mark_read))
            .route("/upload", web::post().to(chat::upload_attachment))
            .route("/ws/{conversation_id}", web::get().to(session::ws_connect)),
    );

    // ── User admin ──
    cfg.service(web::resource("/users").route(web::get().to(users::get_users)));
    cfg.service(
        web::resource("/users/{id}")
            .route(web::get().to(users::get_user))
            .route(web::put().to(users::update_user))
            .route(web::delete().to(users::delete_user)),
    );

    // ── Marketing site forms ──
    cfg.service(web::resource("/contact").route(web::post().to(contact::submit_contact)));
    cfg.service(
        web::resource("/newsletter").route(web::post().to(contact::subscribe_newsletter)),
    );
}
