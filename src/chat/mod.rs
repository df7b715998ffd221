pub mod protocol;
pub mod server;
pub mod session;

use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::chat::protocol::ServerMessage;
use crate::chat::server::ChatServer;
use crate::db::conversations as conversation_db;
use crate::db::messages as message_db;
use crate::db::unread;
use crate::models::messages::{CreateMessage, FileMeta, MessageResponse};

/// Persist a message and fan it out: append the row, bump the
/// conversation's `updated_at`, increment every other participant's unread
/// counter, then push `new_message` to the room and `conversation_update`
/// to each participant's personal channel.
///
/// The caller has already verified the sender is a participant. Real-time
/// pushes are best effort; a dropped receiver is not an error and nothing
/// is retried.
pub async fn send_message(
    db: &DatabaseConnection,
    chat_server: &ChatServer,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: String,
    file: Option<FileMeta>,
) -> Result<MessageResponse, DbErr> {
    let saved = message_db::insert_message(
        db,
        CreateMessage {
            conversation_id,
            sender_id,
            content,
            file,
        },
    )
    .await?;

    conversation_db::touch_conversation(db, conversation_id).await?;

    let participants = conversation_db::get_participants(db, conversation_id).await?;
    let participant_ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
    unread::increment_unread_for_others(db, conversation_id, &participant_ids, sender_id).await?;

    let response = MessageResponse::from(saved);

    chat_server
        .broadcast(
            conversation_id,
            ServerMessage::NewMessage {
                message: response.clone(),
            },
            None,
        )
        .await;

    for user_id in participant_ids {
        chat_server
            .send_to_user(
                user_id,
                ServerMessage::ConversationUpdate {
                    conversation_id,
                    message: response.clone(),
                },
            )
            .await;
    }

    Ok(response)
}
