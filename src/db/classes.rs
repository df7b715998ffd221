use sea_orm::*;
use uuid::Uuid;

use crate::models::classes::{self, CreateClass, ScheduleQuery, UpdateClass};

/// Schedule listing: upcoming classes, optionally narrowed to a course and
/// a date window, ordered by start time.
pub async fn get_schedule(
    db: &DatabaseConnection,
    query: ScheduleQuery,
) -> Result<Vec<classes::Model>, DbErr> {
    let mut find = classes::Entity::find();

    if let Some(course_id) = query.course_id {
        find = find.filter(classes::Column::CourseId.eq(course_id));
    }
    if let Some(from) = query.from {
        find = find.filter(classes::Column::StartsAt.gte(from));
    }
    if let Some(to) = query.to {
        find = find.filter(classes::Column::StartsAt.lte(to));
    }

    find.order_by_asc(classes::Column::StartsAt).all(db).await
}

pub async fn get_class_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<classes::Model>, DbErr> {
    classes::Entity::find_by_id(id).one(db).await
}

pub async fn insert_class(
    db: &DatabaseConnection,
    input: CreateClass,
) -> Result<classes::Model, DbErr> {
    classes::ActiveModel {
        id: Set(Uuid::new_v4()),
        course_id: Set(input.course_id),
        teacher_id: Set(input.teacher_id),
        starts_at: Set(input.starts_at),
        ends_at: Set(input.ends_at),
        capacity: Set(input.capacity),
        location: Set(input.location),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn update_class(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateClass,
) -> Result<classes::Model, DbErr> {
    let class = classes::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Class not found".to_string()))?;

    let mut active: classes::ActiveModel = class.into();

    if let Some(teacher_id) = input.teacher_id {
        active.teacher_id = Set(teacher_id);
    }
    if let Some(starts_at) = input.starts_at {
        active.starts_at = Set(starts_at);
    }
    if let Some(ends_at) = input.ends_at {
        active.ends_at = Set(ends_at);
    }
    if let Some(capacity) = input.capacity {
        active.capacity = Set(capacity);
    }
    if let Some(location) = input.location {
        active.location = Set(Some(location));
    }

    active.update(db).await
}

pub async fn delete_class(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    classes::Entity::delete_by_id(id).exec(db).await
}
