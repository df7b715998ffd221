use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::chat::protocol::ServerMessage;

/// A handle to send messages to a connected WebSocket client.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub user_id: Uuid,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

/// Manages all active WebSocket connections.
///
/// Connections are indexed two ways: by conversation (the room, for
/// `new_message` and typing broadcasts) and by user (the personal channel,
/// for `conversation_update` and `new_conversation` pushes). Delivery is
/// at-most-once, best effort: a send to a dropped receiver is ignored and
/// the disconnect path cleans the handle up.
pub struct ChatServer {
    /// conversation_id -> connected client handles in that room
    rooms: RwLock<HashMap<Uuid, Vec<ClientHandle>>>,
    /// user_id -> all of that user's connection senders
    users: RwLock<HashMap<Uuid, Vec<mpsc::UnboundedSender<ServerMessage>>>>,
}

impl ChatServer {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new WebSocket connection for a conversation. The same
    /// sender is added to the room and to the user's personal channel.
    /// Returns the receiver the WebSocket session should listen on.
    pub async fn join(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = ClientHandle {
            user_id,
            sender: tx.clone(),
        };

        self.rooms
            .write()
            .await
            .entry(conversation_id)
            .or_insert_with(Vec::new)
            .push(handle);

        self.users
            .write()
            .await
            .entry(user_id)
            .or_insert_with(Vec::new)
            .push(tx);

        rx
    }

    /// Remove a WebSocket connection on disconnect.
    pub async fn leave(&self, conversation_id: Uuid, user_id: Uuid) {
        let mut removed: Option<mpsc::UnboundedSender<ServerMessage>> = None;

        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get_mut(&conversation_id) {
            // Remove the first matching handle for this user.
            // (A user could have multiple connections, so only remove one.)
            if let Some(pos) = room.iter().position(|c| c.user_id == user_id) {
                removed = Some(room.remove(pos).sender);
            }
            if room.is_empty() {
                rooms.remove(&conversation_id);
            }
        }
        drop(rooms);

        // Drop the matching personal-channel entry for that same connection.
        if let Some(removed) = removed {
            let mut users = self.users.write().await;
            if let Some(senders) = users.get_mut(&user_id) {
                senders.retain(|s| !s.same_channel(&removed));
                if senders.is_empty() {
                    users.remove(&user_id);
                }
            }
        }
    }

    /// Broadcast a message to all connections in a conversation room,
    /// optionally excluding the sender.
    pub async fn broadcast(
        &self,
        conversation_id: Uuid,
        message: ServerMessage,
        exclude_user: Option<Uuid>,
    ) {
        let rooms = self.rooms.read().await;
        if let Some(room) = rooms.get(&conversation_id) {
            for client in room {
                if Some(client.user_id) == exclude_user {
                    continue;
                }
                // A failed send means the receiver is gone; leave() cleans
                // the handle up.
                let _ = client.sender.send(message.clone());
            }
        }
    }

    /// Send a message to every open connection of one user.
    pub async fn send_to_user(&self, user_id: Uuid, message: ServerMessage) {
        let users = self.users.read().await;
        if let Some(senders) = users.get(&user_id) {
            for sender in senders {
                let _ = sender.send(message.clone());
            }
        }
    }

    /// Whether the user has at least one open connection in this room.
    pub async fn is_user_in_room(&self, conversation_id: Uuid, user_id: Uuid) -> bool {
        let rooms = self.rooms.read().await;
        rooms
            .get(&conversation_id)
            .map(|room| room.iter().any(|c| c.user_id == user_id))
            .unwrap_or(false)
    }
}

impl Default for ChatServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(content: &str) -> ServerMessage {
        ServerMessage::Error {
            message: content.to_string(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone_but_the_excluded_user() {
        let server = ChatServer::new();
        let conversation = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut alice_rx = server.join(conversation, alice).await;
        let mut bob_rx = server.join(conversation, bob).await;

        server
            .broadcast(conversation, text_message("hi"), Some(alice))
            .await;

        assert!(bob_rx.try_recv().is_ok());
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn personal_channel_receives_across_rooms() {
        let server = ChatServer::new();
        let user = Uuid::new_v4();
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();

        let mut rx_a = server.join(room_a, user).await;
        let mut rx_b = server.join(room_b, user).await;

        server.send_to_user(user, text_message("update")).await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn leave_removes_room_and_personal_handles() {
        let server = ChatServer::new();
        let conversation = Uuid::new_v4();
        let user = Uuid::new_v4();

        let mut rx = server.join(conversation, user).await;
        server.leave(conversation, user).await;

        assert!(!server.is_user_in_room(conversation, user).await);
        server.send_to_user(user, text_message("gone")).await;
        assert!(rx.try_recv().is_err());
    }
}
