use actix_web::{HttpResponse, Responder, web};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authorization::verify_conversation_participant;
use crate::auth::middleware::AuthenticatedUser;
use crate::chat;
use crate::chat::protocol::ServerMessage;
use crate::chat::server::ChatServer;
use crate::db::conversations as conversation_db;
use crate::db::conversations::NewConversation;
use crate::db::messages as message_db;
use crate::db::unread;
use crate::db::users as user_db;
use crate::models::conversations::{ConversationSummary, CreateConversation, ParticipantInfo};
use crate::models::messages::{MessageQuery, MessageResponse, SendMessageRequest};

/// Attachment size cap: 5 MiB.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Normalize the requested participant list (sorted, deduplicated, sender
/// removed) and collect field-level validation errors for a new
/// conversation.
fn validate_new_conversation(
    sender_id: Uuid,
    body: &CreateConversation,
) -> (Vec<Uuid>, serde_json::Map<String, serde_json::Value>) {
    let mut others: Vec<Uuid> = body.participant_ids.clone();
    others.sort();
    others.dedup();
    others.retain(|id| *id != sender_id);

    let mut errors = serde_json::Map::new();
    if body.content.trim().is_empty() {
        errors.insert("content".into(), json!("Initial message cannot be empty"));
    }
    if others.is_empty() {
        errors.insert(
            "participant_ids".into(),
            json!("At least one other participant is required"),
        );
    }
    if body.is_group {
        if others.len() < 2 {
            errors.insert(
                "participant_ids".into(),
                json!("A group needs at least two other participants"),
            );
        }
        match &body.name {
            Some(name) if !name.trim().is_empty() => {}
            _ => {
                errors.insert("name".into(), json!("A group needs a name"));
            }
        }
    } else if others.len() > 1 {
        errors.insert(
            "participant_ids".into(),
            json!("A direct conversation has exactly one other participant"),
        );
    }

    (others, errors)
}

/// Only a direct conversation can lose the insert race on the unique pair
/// key. A unique violation while creating a group is a real failure.
fn lost_direct_insert_race(is_group: bool, e: &DbErr) -> bool {
    !is_group && matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// POST /api/chat/conversations — start a conversation with an initial
/// message.
///
/// Direct conversations are deduplicated: at most one exists per unordered
/// pair of users, enforced by the unique `direct_key` index. Asking again
/// returns the existing conversation untouched.
pub async fn create_conversation(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    chat_server: web::Data<Arc<ChatServer>>,
    body: web::Json<CreateConversation>,
) -> impl Responder {
    let sender_id = user.0.id;
    let body = body.into_inner();

    let (others, errors) = validate_new_conversation(sender_id, &body);
    if !errors.is_empty() {
        return HttpResponse::UnprocessableEntity().json(json!({ "errors": errors }));
    }

    // Every listed participant must exist.
    match user_db::get_users_by_ids(db.get_ref(), others.clone()).await {
        Ok(found) if found.len() == others.len() => {}
        Ok(_) => {
            return HttpResponse::NotFound().json(json!({
                "error": "One or more participants do not exist",
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": format!("Database error: {e}"),
            }));
        }
    }

    // Direct conversations: return the existing one if the pair already
    // talked.
    if !body.is_group {
        match conversation_db::find_direct_conversation(db.get_ref(), sender_id, others[0]).await {
            Ok(Some(existing)) => {
                return HttpResponse::Ok().json(json!({ "conversation": existing }));
            }
            Ok(None) => {}
            Err(e) => {
                return HttpResponse::InternalServerError().json(json!({
                    "error": format!("Database error: {e}"),
                }));
            }
        }
    }

    let input = NewConversation {
        sender_id,
        participant_ids: others.clone(),
        is_group: body.is_group,
        name: if body.is_group { body.name } else { None },
        content: body.content,
    };

    let (conversation, first_message) =
        match conversation_db::create_conversation(db.get_ref(), input).await {
            Ok(created) => created,
            // Lost the race against the other side's first message: the
            // unique direct_key index rejected our insert. Return the winner.
            Err(e) if lost_direct_insert_race(body.is_group, &e) => {
                match conversation_db::find_direct_conversation(db.get_ref(), sender_id, others[0])
                    .await
                {
                    Ok(Some(existing)) => {
                        return HttpResponse::Ok().json(json!({ "conversation": existing }));
                    }
                    _ => {
                        return HttpResponse::InternalServerError().json(json!({
                            "error": "Failed to create conversation",
                        }));
                    }
                }
            }
            Err(e) => {
                return HttpResponse::InternalServerError().json(json!({
                    "error": format!("Failed to create conversation: {e}"),
                }));
            }
        };

    // Tell every other participant about the new conversation. Best effort;
    // offline users will see it on their next conversation-list fetch.
    for user_id in &others {
        chat_server
            .send_to_user(
                *user_id,
                ServerMessage::NewConversation {
                    conversation_id: conversation.id,
                },
            )
            .await;
    }

    HttpResponse::Created().json(json!({
        "conversation": conversation,
        "message": MessageResponse::from(first_message),
    }))
}

/// GET /api/chat/conversations — the caller's conversations, most recently
/// active first, with participants, last message and unread count.
pub async fn get_conversations(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> impl Responder {
    let user_id = user.0.id;

    let conversations = match conversation_db::get_conversations_for_user(db.get_ref(), user_id)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    let ids: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();

    let participants =
        match conversation_db::get_participants_for_conversations(db.get_ref(), ids.clone()).await {
            Ok(p) => p,
            Err(e) => {
                return HttpResponse::InternalServerError().json(json!({
                    "error": format!("Database error: {e}"),
                }));
            }
        };

    let latest =
        match message_db::get_latest_messages_for_conversations(db.get_ref(), ids.clone()).await {
            Ok(m) => m,
            Err(e) => {
                return HttpResponse::InternalServerError().json(json!({
                    "error": format!("Database error: {e}"),
                }));
            }
        };

    let unread_counts = match unread::counts_for_conversations(db.get_ref(), ids, user_id).await {
        Ok(u) => u,
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    // Resolve display info for everyone appearing in any conversation.
    let all_user_ids: Vec<Uuid> = participants
        .values()
        .flatten()
        .map(|p| p.user_id)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();

    let users: HashMap<Uuid, _> = match user_db::get_users_by_ids(db.get_ref(), all_user_ids).await
    {
        Ok(list) => list.into_iter().map(|u| (u.id, u)).collect(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    let summaries: Vec<ConversationSummary> = conversations
        .into_iter()
        .map(|c| {
            let members = participants
                .get(&c.id)
                .map(|rows| {
                    rows.iter()
                        .map(|p| {
                            let u = users.get(&p.user_id);
                            ParticipantInfo {
                                user_id: p.user_id,
                                display_name: u.and_then(|u| u.display_name.clone()),
                                avatar_url: u.and_then(|u| u.avatar_url.clone()),
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();

            ConversationSummary {
                id: c.id,
                is_group: c.is_group,
                name: c.name,
                participants: members,
                last_message: latest.get(&c.id).cloned().map(MessageResponse::from),
                unread_count: unread_counts.get(&c.id).copied().unwrap_or(0),
                updated_at: c.updated_at,
            }
        })
        .collect();

    HttpResponse::Ok().json(summaries)
}

/// GET /api/chat/conversations/{id}/messages — paginated history, newest
/// first, participants only.
pub async fn get_messages(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<MessageQuery>,
) -> impl Responder {
    let conversation_id = path.into_inner();
    let user_id = user.0.id;

    if let Err(resp) = verify_conversation_participant(db.get_ref(), conversation_id, user_id).await
    {
        return resp;
    }

    let limit = query.limit.unwrap_or(50).min(100);

    match message_db::get_messages_by_conversation(
        db.get_ref(),
        conversation_id,
        limit,
        query.before,
        query.before_id,
    )
    .await
    {
        Ok(messages) => {
            let response: Vec<MessageResponse> = messages.into_iter().map(|m| m.into()).collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// POST /api/chat/conversations/{id}/messages — append a message over REST.
/// Same pipeline as the WebSocket `send_message` frame.
pub async fn send_message(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    chat_server: web::Data<Arc<ChatServer>>,
    path: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> impl Responder {
    let conversation_id = path.into_inner();
    let sender_id = user.0.id;
    let body = body.into_inner();

    if let Err(resp) =
        verify_conversation_participant(db.get_ref(), conversation_id, sender_id).await
    {
        return resp;
    }

    if body.content.trim().is_empty() && body.file.is_none() {
        return HttpResponse::UnprocessableEntity().json(json!({
            "errors": { "content": "Message must have content or an attachment" },
        }));
    }

    match chat::send_message(
        db.get_ref(),
        chat_server.get_ref(),
        conversation_id,
        sender_id,
        body.content,
        body.file,
    )
    .await
    {
        Ok(message) => HttpResponse::Created().json(message),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to send message: {e}"),
        })),
    }
}

/// POST /api/chat/conversations/{id}/read — zero the caller's unread
/// counter for this conversation.
pub async fn mark_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let conversation_id = path.into_inner();
    let user_id = user.0.id;

    if let Err(resp) = verify_conversation_participant(db.get_ref(), conversation_id, user_id).await
    {
        return resp;
    }

    match unread::clear_unread(db.get_ref(), conversation_id, user_id).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "conversation_id": conversation_id,
            "unread_count": 0,
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to mark conversation read: {e}"),
        })),
    }
}

/// Query params for the attachment upload endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct UploadQuery {
    pub name: String,
    pub mime: Option<String>,
}

/// POST /api/chat/upload?name=<filename>&mime=<type> — accept an attachment
/// body and hand back the URL to reference it by.
///
/// Object storage is not wired up yet: the handler enforces the size cap
/// and returns a placeholder URL.
/// TODO: replace the placeholder with a real object-storage PUT once the
/// media bucket is provisioned.
pub async fn upload_attachment(
    _user: AuthenticatedUser,
    body: web::Bytes,
    query: web::Query<UploadQuery>,
) -> impl Responder {
    if body.len() > MAX_UPLOAD_BYTES {
        return HttpResponse::PayloadTooLarge().json(json!({
            "error": format!("Attachment exceeds the {MAX_UPLOAD_BYTES} byte limit"),
        }));
    }
    if body.is_empty() {
        return HttpResponse::UnprocessableEntity().json(json!({
            "errors": { "file": "Attachment body is empty" },
        }));
    }

    let mime = query.mime.clone().unwrap_or_else(|| {
        "application/octet-stream".to_string()
    });

    // let url = storage::put_object(&query.name, &mime, &body).await?;
    let url = format!("https://files.linguahub.invalid/{}/{}", Uuid::new_v4(), query.name);

    HttpResponse::Ok().json(json!({
        "url": url,
        "name": query.name,
        "mime": mime,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        participant_ids: Vec<Uuid>,
        content: &str,
        is_group: bool,
        name: Option<&str>,
    ) -> CreateConversation {
        CreateConversation {
            participant_ids,
            content: content.to_string(),
            is_group,
            name: name.map(|n| n.to_string()),
        }
    }

    #[test]
    fn direct_conversation_with_one_other_is_valid() {
        let sender = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (others, errors) =
            validate_new_conversation(sender, &request(vec![other], "hola", false, None));

        assert!(errors.is_empty());
        assert_eq!(others, vec![other]);
    }

    #[test]
    fn sender_and_duplicates_are_removed_from_participants() {
        let sender = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (others, errors) = validate_new_conversation(
            sender,
            &request(vec![other, sender, other], "hola", false, None),
        );

        assert!(errors.is_empty());
        assert_eq!(others, vec![other]);
    }

    #[test]
    fn empty_initial_message_is_rejected() {
        let sender = Uuid::new_v4();
        let (_, errors) =
            validate_new_conversation(sender, &request(vec![Uuid::new_v4()], "   ", false, None));

        assert!(errors.contains_key("content"));
    }

    #[test]
    fn direct_conversation_rejects_more_than_one_other() {
        let sender = Uuid::new_v4();
        let (_, errors) = validate_new_conversation(
            sender,
            &request(vec![Uuid::new_v4(), Uuid::new_v4()], "hola", false, None),
        );

        assert!(errors.contains_key("participant_ids"));
    }

    #[test]
    fn group_requires_a_name() {
        let sender = Uuid::new_v4();
        let (_, errors) = validate_new_conversation(
            sender,
            &request(vec![Uuid::new_v4(), Uuid::new_v4()], "hola", true, None),
        );

        assert!(errors.contains_key("name"));

        let (_, errors) = validate_new_conversation(
            sender,
            &request(vec![Uuid::new_v4(), Uuid::new_v4()], "hola", true, Some("  ")),
        );

        assert!(errors.contains_key("name"));
    }

    #[test]
    fn group_requires_at_least_two_others() {
        let sender = Uuid::new_v4();
        let (_, errors) = validate_new_conversation(
            sender,
            &request(vec![Uuid::new_v4()], "hola", true, Some("Book club")),
        );

        assert!(errors.contains_key("participant_ids"));
    }

    #[test]
    fn valid_group_passes() {
        let sender = Uuid::new_v4();
        let (others, errors) = validate_new_conversation(
            sender,
            &request(
                vec![Uuid::new_v4(), Uuid::new_v4()],
                "hola",
                true,
                Some("Book club"),
            ),
        );

        assert!(errors.is_empty());
        assert_eq!(others.len(), 2);
    }

    #[test]
    fn group_insert_failure_is_never_treated_as_a_lost_race() {
        let err = DbErr::Custom("duplicate key value violates unique constraint".to_string());

        assert!(!lost_direct_insert_race(true, &err));
    }

    #[test]
    fn plain_errors_are_not_a_lost_race() {
        let err = DbErr::Custom("connection reset".to_string());

        assert!(!lost_direct_insert_race(false, &err));
    }
}
