pub mod admins;
pub mod classes;
pub mod contact_messages;
pub mod conversations;
pub mod courses;
pub mod enrollments;
pub mod messages;
pub mod newsletter_subscribers;
pub mod participants;
pub mod password_reset_tokens;
pub mod payments;
pub mod posts;
pub mod students;
pub mod teachers;
pub mod unread_messages;
pub mod users;
