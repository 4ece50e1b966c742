use std::sync::Arc;
use tracing::{info, warn};

use crate::room_manager::{ActionError, RoomManager};
use crate::websocket::connection::ConnectionManager;
use numble_types::{ClientMessage, ServerMessage};

/// Dispatches one client's inbound actions to the room state machine and
/// routes unicast replies back through its channel. No failure here is
/// fatal to the connection task.
#[derive(Clone)]
pub struct MessageHandler {
    client_id: String,
    connections: Arc<ConnectionManager>,
    rooms: Arc<RoomManager>,
}

impl MessageHandler {
    pub fn new(
        client_id: String,
        connections: Arc<ConnectionManager>,
        rooms: Arc<RoomManager>,
    ) -> Self {
        Self {
            client_id,
            connections,
            rooms,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) {
        match message {
            ClientMessage::CreateRoom => self.handle_create_room().await,
            ClientMessage::JoinRoom { room_id } => self.handle_join_room(&room_id).await,
            ClientMessage::SetPlayerSetup {
                room_id,
                name,
                secret,
            } => {
                let result = self
                    .rooms
                    .set_player_setup(&self.client_id, &room_id, &name, &secret)
                    .await;
                self.settle(result);
            }
            ClientMessage::StartGame { room_id } => {
                let result = self.rooms.start_game(&self.client_id, &room_id).await;
                self.settle(result);
            }
            ClientMessage::SubmitGuess { room_id, guess } => {
                info!("Client {} submitting guess: {}", self.client_id, guess);
                let result = self
                    .rooms
                    .submit_guess(&self.client_id, &room_id, &guess)
                    .await;
                self.settle(result);
            }
            ClientMessage::Rematch { room_id } => {
                let result = self.rooms.rematch(&self.client_id, &room_id).await;
                self.settle(result);
            }
        }
    }

    pub async fn handle_disconnect(&self) {
        info!("Handling disconnect for client {}", self.client_id);
        self.rooms.handle_disconnect(&self.client_id).await;
    }

    async fn handle_create_room(&self) {
        let room_id = self.rooms.create_room(&self.client_id).await;
        self.send(ServerMessage::RoomCreated { room_id });
    }

    async fn handle_join_room(&self, room_id: &str) {
        match self.rooms.join_room(&self.client_id, room_id).await {
            Ok(()) => self.send(ServerMessage::JoinedRoom {
                room_id: room_id.to_string(),
            }),
            Err(e) => self.settle(Err(e)),
        }
    }

    /// Surfaces rejected actions as a unicast error event; ignored actions
    /// stay silent.
    fn settle(&self, result: Result<(), ActionError>) {
        match result {
            Ok(()) | Err(ActionError::Ignored) => {}
            Err(ActionError::Rejected(message)) => self.send_error(&message),
        }
    }

    pub fn send_error(&self, message: &str) {
        self.send(ServerMessage::Error {
            message: message.to_string(),
        });
    }

    fn send(&self, message: ServerMessage) {
        if let Err(e) = self.connections.send_to(&self.client_id, message) {
            warn!("Failed to reply to {}: {}", self.client_id, e);
        }
    }
}
