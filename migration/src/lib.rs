pub use sea_orm_migration::prelude::*;

mod m20250815_000001_create_users_tables;
mod m20250815_000002_create_courses_tables;
mod m20250815_000003_create_enrollments_tables;
mod m20250815_000004_create_posts_table;
mod m20250815_000005_create_messaging_tables;
mod m20250815_000006_create_password_reset_tokens;
mod m20250815_000007_create_contact_tables;
mod m20250815_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_000001_create_users_tables::Migration),
            Box::new(m20250815_000002_create_courses_tables::Migration),
            Box::new(m20250815_000003_create_enrollments_tables::Migration),
            Box::new(m20250815_000004_create_posts_table::Migration),
            Box::new(m20250815_000005_create_messaging_tables::Migration),
            Box::new(m20250815_000006_create_password_reset_tokens::Migration),
            Box::new(m20250815_000007_create_contact_tables::Migration),
            Box::new(m20250815_000008_add_indexes::Migration),
        ]
    }
}
