use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{FeedbackColor, GameState, PlayerId, PlayerSummary, RoomCode};

/// Inbound client actions. The tag is the `action` field of the JSON
/// envelope; unknown action names fail deserialization and are answered
/// with an `error` event rather than being silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom,
    JoinRoom {
        room_id: RoomCode,
    },
    SetPlayerSetup {
        room_id: RoomCode,
        name: String,
        secret: String,
    },
    StartGame {
        room_id: RoomCode,
    },
    SubmitGuess {
        room_id: RoomCode,
        guess: String,
    },
    Rematch {
        room_id: RoomCode,
    },
}

/// Outbound events, tagged by the `type` field of the JSON envelope.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room_id: RoomCode,
    },
    JoinedRoom {
        room_id: RoomCode,
    },
    PlayerJoined {
        room_id: RoomCode,
        game_state: GameState,
        players: Vec<PlayerSummary>,
    },
    PlayerReady {
        player_id: PlayerId,
        name: String,
        game_state: GameState,
        players: Vec<PlayerSummary>,
    },
    GameStarted {
        game_state: GameState,
        players: Vec<PlayerSummary>,
    },
    GuessMade {
        player_id: PlayerId,
        guess: String,
        feedback: Vec<FeedbackColor>,
        attempt: u32,
    },
    GameOver {
        winner_id: Option<PlayerId>,
        winner_name: Option<String>,
        reason: Option<String>,
        message: Option<String>,
        p1_secret: Option<String>,
        p2_secret: Option<String>,
    },
    PlayerDisconnected {
        player_id: PlayerId,
    },
    RematchStarted {
        game_state: GameState,
    },
    Error {
        message: String,
    },
}
