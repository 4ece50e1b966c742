use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::registry::SessionRegistry;
use crate::websocket::connection::ConnectionManager;
use numble_core::{DisconnectOutcome, RoomError, RoundEnd, rules};
use numble_types::{Room, RoomCode, ServerMessage};

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ATTEMPTS: u32 = 5;

/// What the connection handler should do with a failed action: surface a
/// unicast error event, or drop it silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{0}")]
    Rejected(String),
    #[error("action ignored")]
    Ignored,
}

/// Validation failures are surfaced to the offending caller; referential
/// and status-guard failures are dropped.
fn disposition(error: RoomError) -> ActionError {
    match error {
        RoomError::RoomFull
        | RoomError::InvalidSecret
        | RoomError::InvalidGuess
        | RoomError::EmptyName
        | RoomError::NotHost
        | RoomError::PlayersNotReady => ActionError::Rejected(error.to_string()),
        RoomError::AlreadyJoined
        | RoomError::NotInSetup
        | RoomError::NotPlaying
        | RoomError::GuessLimitReached
        | RoomError::NotFinished
        | RoomError::NotInRoom => ActionError::Ignored,
    }
}

/// The room state machine's front door. Every mutation runs under a single
/// lock so that only one transition per process is ever in flight, which is
/// what makes win tie-breaks and disconnect forfeiture well-defined.
/// Broadcasts happen inside the lock (sends are non-blocking channel
/// pushes); the durable write-through happens after it is released so a
/// stalled store never delays the next action.
pub struct RoomManager {
    registry: Arc<SessionRegistry>,
    connections: Arc<ConnectionManager>,
    mutation: Mutex<()>,
}

impl RoomManager {
    pub fn new(registry: Arc<SessionRegistry>, connections: Arc<ConnectionManager>) -> Self {
        Self {
            registry,
            connections,
            mutation: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub async fn create_room(&self, client_id: &str) -> RoomCode {
        let room = {
            let _guard = self.mutation.lock().await;
            let code = self.unique_room_code().await;
            let room = rules::create_room(code, client_id);
            self.registry.put(room.clone()).await;
            info!("Client {} created room {}", client_id, room.id);
            room
        };

        self.registry.persist(&room).await;
        room.id
    }

    pub async fn join_room(&self, client_id: &str, room_id: &str) -> Result<(), ActionError> {
        let room = {
            let _guard = self.mutation.lock().await;
            let Some(mut room) = self.registry.get(room_id).await else {
                return Err(ActionError::Rejected("Room full or invalid".to_string()));
            };

            match rules::join(&mut room, client_id) {
                Ok(()) => {}
                // Rejoining a room you already occupy is acknowledged
                // without reseating or a duplicate broadcast.
                Err(RoomError::AlreadyJoined) => return Ok(()),
                Err(RoomError::RoomFull) => {
                    return Err(ActionError::Rejected("Room full or invalid".to_string()));
                }
                Err(e) => return Err(disposition(e)),
            }

            self.registry.put(room.clone()).await;
            info!("Client {} joined room {}", client_id, room_id);
            self.connections.broadcast_to_room(
                &room,
                ServerMessage::PlayerJoined {
                    room_id: room.id.clone(),
                    game_state: room.game_state.clone(),
                    players: room.roster(),
                },
            );
            room
        };

        self.registry.persist(&room).await;
        Ok(())
    }

    pub async fn set_player_setup(
        &self,
        client_id: &str,
        room_id: &str,
        name: &str,
        secret: &str,
    ) -> Result<(), ActionError> {
        let room = {
            let _guard = self.mutation.lock().await;
            let Some(mut room) = self.unknown_room_guard(room_id, "set_player_setup").await
            else {
                return Err(ActionError::Ignored);
            };

            rules::set_player_setup(&mut room, client_id, name, secret).map_err(disposition)?;

            self.registry.put(room.clone()).await;
            let name = room
                .player(client_id)
                .and_then(|p| p.name.clone())
                .unwrap_or_default();
            self.connections.broadcast_to_room(
                &room,
                ServerMessage::PlayerReady {
                    player_id: client_id.to_string(),
                    name,
                    game_state: room.game_state.clone(),
                    players: room.roster(),
                },
            );
            room
        };

        self.registry.persist(&room).await;
        Ok(())
    }

    pub async fn start_game(&self, client_id: &str, room_id: &str) -> Result<(), ActionError> {
        let room = {
            let _guard = self.mutation.lock().await;
            let Some(mut room) = self.unknown_room_guard(room_id, "start_game").await else {
                return Err(ActionError::Ignored);
            };

            rules::start(&mut room, client_id).map_err(disposition)?;

            self.registry.put(room.clone()).await;
            info!("Room {} started playing", room_id);
            self.connections.broadcast_to_room(
                &room,
                ServerMessage::GameStarted {
                    game_state: room.game_state.clone(),
                    players: room.roster(),
                },
            );
            room
        };

        self.registry.persist(&room).await;
        Ok(())
    }

    pub async fn submit_guess(
        &self,
        client_id: &str,
        room_id: &str,
        guess: &str,
    ) -> Result<(), ActionError> {
        let room = {
            let _guard = self.mutation.lock().await;
            let Some(mut room) = self.unknown_room_guard(room_id, "submit_guess").await else {
                return Err(ActionError::Ignored);
            };

            let outcome =
                rules::submit_guess(&mut room, client_id, guess).map_err(disposition)?;

            self.registry.put(room.clone()).await;
            self.connections.broadcast_to_room(
                &room,
                ServerMessage::GuessMade {
                    player_id: client_id.to_string(),
                    guess: guess.to_string(),
                    feedback: outcome.record.feedback.clone(),
                    attempt: outcome.attempt,
                },
            );

            match outcome.end {
                Some(RoundEnd::Won { winner_id }) => {
                    info!("Room {} won by {}", room_id, winner_id);
                    self.connections
                        .broadcast_to_room(&room, game_over_message(&room, None, None));
                }
                Some(RoundEnd::Draw) => {
                    info!("Room {} ended in a draw", room_id);
                    self.connections.broadcast_to_room(
                        &room,
                        game_over_message(
                            &room,
                            None,
                            Some("Both players are out of guesses".to_string()),
                        ),
                    );
                }
                None => {}
            }
            room
        };

        self.registry.persist(&room).await;
        Ok(())
    }

    pub async fn rematch(&self, client_id: &str, room_id: &str) -> Result<(), ActionError> {
        let room = {
            let _guard = self.mutation.lock().await;
            let Some(mut room) = self.unknown_room_guard(room_id, "rematch").await else {
                return Err(ActionError::Ignored);
            };

            rules::rematch(&mut room).map_err(disposition)?;

            self.registry.put(room.clone()).await;
            info!("Room {} reset for a rematch by {}", room_id, client_id);
            self.connections.broadcast_to_room(
                &room,
                ServerMessage::RematchStarted {
                    game_state: room.game_state.clone(),
                },
            );
            room
        };

        self.registry.persist(&room).await;
        Ok(())
    }

    /// Marks every cached room holding this identity as disconnected and
    /// applies forfeiture where a round was in progress.
    pub async fn handle_disconnect(&self, client_id: &str) {
        let mutated = {
            let _guard = self.mutation.lock().await;
            let mut mutated = Vec::new();

            for room_id in self.registry.rooms_for_player(client_id).await {
                let Some(mut room) = self.registry.get(&room_id).await else {
                    continue;
                };

                match rules::mark_disconnected(&mut room, client_id) {
                    DisconnectOutcome::NotAMember => continue,
                    DisconnectOutcome::Forfeit { winner_id } => {
                        info!(
                            "Client {} forfeited room {} to {}",
                            client_id, room_id, winner_id
                        );
                        self.registry.put(room.clone()).await;
                        self.connections.broadcast_to_room(
                            &room,
                            game_over_message(
                                &room,
                                Some("opponent disconnected".to_string()),
                                None,
                            ),
                        );
                    }
                    DisconnectOutcome::Notice => {
                        self.registry.put(room.clone()).await;
                        self.connections.broadcast_to_room(
                            &room,
                            ServerMessage::PlayerDisconnected {
                                player_id: client_id.to_string(),
                            },
                        );
                    }
                }
                mutated.push(room);
            }
            mutated
        };

        for room in &mutated {
            self.registry.persist(room).await;
        }
    }

    async fn unknown_room_guard(&self, room_id: &str, action: &str) -> Option<Room> {
        let room = self.registry.get(room_id).await;
        if room.is_none() {
            debug!("Dropping {} against unknown room {}", action, room_id);
        }
        room
    }

    /// 6-character upper-case code from a v4 UUID, with a bounded retry
    /// loop against the registry as collision hardening.
    async fn unique_room_code(&self) -> RoomCode {
        for attempt in 0..ROOM_CODE_ATTEMPTS {
            let code = Uuid::new_v4().simple().to_string()[..ROOM_CODE_LEN].to_uppercase();
            if !self.registry.contains(&code).await {
                return code;
            }
            warn!("Room code collision on {} (attempt {})", code, attempt + 1);
        }
        // Astronomically unlikely; accept the last candidate.
        Uuid::new_v4().simple().to_string()[..ROOM_CODE_LEN].to_uppercase()
    }
}

fn game_over_message(room: &Room, reason: Option<String>, message: Option<String>) -> ServerMessage {
    let winner_id = room.game_state.winner_id.clone();
    let winner_name = winner_id
        .as_deref()
        .and_then(|id| room.player(id))
        .and_then(|p| p.name.clone());

    ServerMessage::GameOver {
        winner_id,
        winner_name,
        reason,
        message,
        p1_secret: room.player1.secret.clone(),
        p2_secret: room.player2.as_ref().and_then(|p| p.secret.clone()),
    }
}
