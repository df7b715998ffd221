use sea_orm::*;
use uuid::Uuid;

use crate::models::classes;
use crate::models::enrollments::{self, Status};

/// Check whether a student already has an enrollment for a class.
pub async fn enrollment_exists(
    db: &DatabaseConnection,
    class_id: Uuid,
    student_id: Uuid,
) -> Result<bool, DbErr> {
    let count = enrollments::Entity::find()
        .filter(enrollments::Column::ClassId.eq(class_id))
        .filter(enrollments::Column::StudentId.eq(student_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Insert a new enrollment in Pending status.
pub async fn insert_enrollment(
    db: &DatabaseConnection,
    class_id: Uuid,
    student_id: Uuid,
) -> Result<enrollments::Model, DbErr> {
    enrollments::ActiveModel {
        id: Set(Uuid::new_v4()),
        class_id: Set(class_id),
        student_id: Set(student_id),
        status: Set(Status::Pending),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
}

pub async fn get_enrollment_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<enrollments::Model>, DbErr> {
    enrollments::Entity::find_by_id(id).one(db).await
}

/// Enrollments created by one student.
pub async fn get_enrollments_by_student(
    db: &DatabaseConnection,
    student_id: Uuid,
) -> Result<Vec<enrollments::Model>, DbErr> {
    enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .order_by_desc(enrollments::Column::CreatedAt)
        .all(db)
        .await
}

/// Enrollments for every class taught by one teacher.
pub async fn get_enrollments_for_teacher(
    db: &DatabaseConnection,
    teacher_id: Uuid,
) -> Result<Vec<enrollments::Model>, DbErr> {
    enrollments::Entity::find()
        .join(JoinType::InnerJoin, enrollments::Relation::Class.def())
        .filter(classes::Column::TeacherId.eq(teacher_id))
        .order_by_desc(enrollments::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch every enrollment (admin view).
pub async fn get_all_enrollments(
    db: &DatabaseConnection,
) -> Result<Vec<enrollments::Model>, DbErr> {
    enrollments::Entity::find()
        .order_by_desc(enrollments::Column::CreatedAt)
        .all(db)
        .await
}

/// Transition an enrollment's status. Legality of the transition is checked
/// by the handler; this just writes the new value.
pub async fn update_enrollment_status(
    db: &DatabaseConnection,
    id: Uuid,
    status: Status,
) -> Result<enrollments::Model, DbErr> {
    let enrollment = enrollments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Enrollment not found".to_string()))?;

    let mut active: enrollments::ActiveModel = enrollment.into();
    active.status = Set(status);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
