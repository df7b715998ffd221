use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::messages::{FileMeta, MessageResponse};

// ── Client -> Server messages ──

/// Messages the client sends to the server over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Send a chat message, optionally with an uploaded attachment.
    SendMessage {
        content: String,
        file: Option<FileMeta>,
    },
    /// Notify the other participants that the user is typing.
    /// Debouncing is the client's job; the server keeps no typing state.
    Typing,
    /// Notify the other participants that the user stopped typing.
    StopTyping,
}

// ── Server -> Client messages ──

/// Messages the server sends to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new message in a conversation the client has open (includes the
    /// echo of the sender's own message, with server-assigned id and time).
    NewMessage { message: MessageResponse },
    /// A conversation the user participates in has new activity; sent to
    /// the user's personal channel to refresh the conversation list.
    ConversationUpdate {
        conversation_id: Uuid,
        message: MessageResponse,
    },
    /// The user was added to a newly created conversation.
    NewConversation { conversation_id: Uuid },
    /// Another participant started or stopped typing.
    TypingIndicator {
        conversation_id: Uuid,
        user_id: Uuid,
        typing: bool,
    },
    /// An error occurred.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_send_message_deserializes() {
        let raw = r#"{"type":"send_message","content":"hola","file":null}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::SendMessage { ref content, file: None } if content == "hola"
        ));
    }

    #[test]
    fn typing_frames_deserialize() {
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"typing"}"#).unwrap(),
            ClientMessage::Typing
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"stop_typing"}"#).unwrap(),
            ClientMessage::StopTyping
        ));
    }

    #[test]
    fn server_messages_carry_a_type_tag() {
        let msg = ServerMessage::NewConversation {
            conversation_id: Uuid::new_v4(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "new_conversation");
    }
}
