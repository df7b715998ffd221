use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::jwt;
use crate::auth::middleware::JwtSecret;
use crate::chat::protocol::{ClientMessage, ServerMessage};
use crate::chat::server::ChatServer;
use crate::db::conversations as conversation_db;

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/chat/ws/{conversation_id}?token=<jwt>
///
/// Upgrades the HTTP connection to a WebSocket.
/// Authenticates via query param token (browsers can't send Authorization
/// headers during the WebSocket handshake).
/// Validates that:
/// 1. The JWT is valid.
/// 2. The conversation exists.
/// 3. The user is a participant of the conversation.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<Uuid>,
    query: web::Query<WsQuery>,
    db: web::Data<DatabaseConnection>,
    secret: web::Data<JwtSecret>,
    chat_server: web::Data<Arc<ChatServer>>,
) -> Result<HttpResponse, actix_web::Error> {
    let conversation_id = path.into_inner();
    let token = &query.token;

    // 1. Validate the JWT.
    let claims = jwt::validate_token(token, &secret.0)
        .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;

    let user_id = claims
        .user_id()
        .map_err(actix_web::error::ErrorUnauthorized)?;

    // 2. The conversation must exist.
    conversation_db::get_conversation_by_id(db.get_ref(), conversation_id)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| {
            actix_web::error::ErrorNotFound(format!("Conversation {conversation_id} not found"))
        })?;

    // 3. The user must be a participant (live query, not a cached set).
    let is_member = conversation_db::is_participant(db.get_ref(), conversation_id, user_id)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Database error: {e}")))?;

    if !is_member {
        return Err(actix_web::error::ErrorForbidden(
            "You are not a participant of this conversation",
        ));
    }

    // 4. Upgrade to WebSocket.
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    // 5. Join the room (and the user's personal channel) and get a receiver.
    let rx = chat_server.join(conversation_id, user_id).await;

    // 6. Spawn the WebSocket session task.
    let db_clone = db.get_ref().clone();
    let chat_server_clone = chat_server.get_ref().clone();

    actix_web::rt::spawn(handle_ws_session(
        session,
        msg_stream,
        rx,
        conversation_id,
        user_id,
        db_clone,
        chat_server_clone,
    ));

    Ok(response)
}

/// Drives the WebSocket session: reads incoming frames from the client,
/// forwards outgoing messages from the chat server, and cleans up on
/// disconnect.
async fn handle_ws_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    conversation_id: Uuid,
    user_id: Uuid,
    db: DatabaseConnection,
    chat_server: Arc<ChatServer>,
) {
    loop {
        tokio::select! {
            // Incoming message from the WebSocket client.
            Some(msg) = msg_stream.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        handle_client_message(
                            &text,
                            &mut session,
                            conversation_id,
                            user_id,
                            &db,
                            &chat_server,
                        )
                        .await;
                    }
                    Ok(Message::Ping(bytes)) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        break;
                    }
                    Err(_) => {
                        break;
                    }
                    _ => {}
                }
            }
            // Outgoing message from the chat server to this client.
            Some(server_msg) = rx.recv() => {
                let json = match serde_json::to_string(&server_msg) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if session.text(json).await.is_err() {
                    break;
                }
            }
            // Both channels closed — exit.
            else => break,
        }
    }

    chat_server.leave(conversation_id, user_id).await;
    let _ = session.close(None).await;
}

/// Parse and handle an incoming client frame.
async fn handle_client_message(
    text: &str,
    session: &mut actix_ws::Session,
    conversation_id: Uuid,
    user_id: Uuid,
    db: &DatabaseConnection,
    chat_server: &ChatServer,
) {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            let err = ServerMessage::Error {
                message: format!("Invalid message format: {e}"),
            };
            let _ = session
                .text(serde_json::to_string(&err).unwrap_or_default())
                .await;
            return;
        }
    };

    match client_msg {
        ClientMessage::SendMessage { content, file } => {
            if content.trim().is_empty() && file.is_none() {
                let err = ServerMessage::Error {
                    message: "Message must have content or an attachment".to_string(),
                };
                let _ = session
                    .text(serde_json::to_string(&err).unwrap_or_default())
                    .await;
                return;
            }

            if let Err(e) =
                super::send_message(db, chat_server, conversation_id, user_id, content, file).await
            {
                tracing::warn!("Failed to save message: {e}");
                let err = ServerMessage::Error {
                    message: format!("Failed to save message: {e}"),
                };
                let _ = session
                    .text(serde_json::to_string(&err).unwrap_or_default())
                    .await;
            }
        }

        ClientMessage::Typing => {
            let msg = ServerMessage::TypingIndicator {
                conversation_id,
                user_id,
                typing: true,
            };
            // Only send to others — the sender already knows they're typing.
            chat_server.broadcast(conversation_id, msg, Some(user_id)).await;
        }

        ClientMessage::StopTyping => {
            let msg = ServerMessage::TypingIndicator {
                conversation_id,
                user_id,
                typing: false,
            };
            chat_server.broadcast(conversation_id, msg, Some(user_id)).await;
        }
    }
}
