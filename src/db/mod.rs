pub mod classes;
pub mod contact;
pub mod conversations;
pub mod courses;
pub mod enrollments;
pub mod messages;
pub mod password_resets;
pub mod payments;
pub mod posts;
pub mod teachers;
pub mod unread;
pub mod users;

use sea_orm::{Database, DatabaseConnection};
use std::env;

/// Create a SeaORM database connection pool from the `DATABASE_URL` env var.
pub async fn create_pool() -> DatabaseConnection {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    Database::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
