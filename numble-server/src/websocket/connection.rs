use dashmap::DashMap;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use numble_types::{PlayerId, Room, ServerMessage};

#[derive(Debug)]
pub struct Connection {
    pub client_id: PlayerId,
    pub connected_at: Instant,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    fn send(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }
}

/// Presence tracker and broadcast fan-out: maps a client identity to its
/// live outbound channel. Delivery to one recipient never depends on the
/// other being reachable.
pub struct ConnectionManager {
    connections: DashMap<PlayerId, Connection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Registers a live channel for this identity and hands back the
    /// receiving half for the connection's outgoing pump. A re-register
    /// replaces any stale channel left by an earlier socket.
    pub fn register(&self, client_id: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection = Connection {
            client_id: client_id.to_string(),
            connected_at: Instant::now(),
            sender,
        };

        if self.connections.insert(client_id.to_string(), connection).is_some() {
            info!("Replaced existing channel for client {}", client_id);
        }

        receiver
    }

    pub fn unregister(&self, client_id: &str) {
        self.connections.remove(client_id);
    }

    pub fn is_connected(&self, client_id: &str) -> bool {
        self.connections.contains_key(client_id)
    }

    pub fn send_to(&self, client_id: &str, message: ServerMessage) -> Result<(), String> {
        match self.connections.get(client_id) {
            Some(connection) => connection.send(message),
            None => Err("Connection not found".to_string()),
        }
    }

    /// Delivers an event to every occupied, currently-connected slot of the
    /// room, host slot first. An occupied slot without a live channel is
    /// logged and skipped.
    pub fn broadcast_to_room(&self, room: &Room, message: ServerMessage) {
        let mut recipients = vec![&room.player1];
        if let Some(ref guest) = room.player2 {
            recipients.push(guest);
        }

        for player in recipients {
            match self.connections.get(&player.id) {
                Some(connection) => {
                    if let Err(e) = connection.send(message.clone()) {
                        warn!(
                            "Failed to deliver event to {} in room {}: {}",
                            player.id, room.id, e
                        );
                    }
                }
                None => {
                    debug!("No live channel for {} in room {}", player.id, room.id);
                }
            }
        }
    }

    // Test helper
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
