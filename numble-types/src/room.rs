use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub type PlayerId = String;
pub type RoomCode = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackColor {
    Green,  // correct digit in correct position
    Yellow, // correct digit in wrong position
    Grey,   // digit not in the secret
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRecord {
    pub guess: String,
    pub feedback: Vec<FeedbackColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: Option<String>,
    pub is_host: bool,
    pub connected: bool,
    pub is_ready: bool,
    pub secret: Option<String>,
    pub guesses: Vec<GuessRecord>,
    pub has_won: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, is_host: bool) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_host,
            connected: true,
            is_ready: false,
            secret: None,
            guesses: Vec::new(),
            has_won: false,
        }
    }

    /// Clears round-scoped fields ahead of a rematch. Identity, name and
    /// connectivity survive across rounds.
    pub fn reset_round(&mut self) {
        self.secret = None;
        self.guesses.clear();
        self.is_ready = false;
        self.has_won = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Setup,
    Playing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameState {
    pub status: GameStatus,
    pub winner_id: Option<PlayerId>,
    pub started_at: Option<String>, // ISO 8601 string
}

impl GameState {
    pub fn new() -> Self {
        Self {
            status: GameStatus::Waiting,
            winner_id: None,
            started_at: None,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Roster entry safe to broadcast to both players. Never carries a secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: Option<String>,
    pub is_host: bool,
    pub connected: bool,
    pub is_ready: bool,
    pub has_won: bool,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        PlayerSummary {
            id: player.id.clone(),
            name: player.name.clone(),
            is_host: player.is_host,
            connected: player.connected,
            is_ready: player.is_ready,
            has_won: player.has_won,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Room {
    pub id: RoomCode,
    pub player1: Player,
    pub player2: Option<Player>,
    pub game_state: GameState,
}

impl Room {
    pub fn is_member(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        if self.player1.id == player_id {
            Some(&self.player1)
        } else {
            self.player2.as_ref().filter(|p| p.id == player_id)
        }
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        if self.player1.id == player_id {
            Some(&mut self.player1)
        } else {
            self.player2.as_mut().filter(|p| p.id == player_id)
        }
    }

    pub fn opponent(&self, player_id: &str) -> Option<&Player> {
        if self.player1.id == player_id {
            self.player2.as_ref()
        } else if self.player2.as_ref().is_some_and(|p| p.id == player_id) {
            Some(&self.player1)
        } else {
            None
        }
    }

    /// Roster snapshot in slot order, host first.
    pub fn roster(&self) -> Vec<PlayerSummary> {
        let mut players = vec![PlayerSummary::from(&self.player1)];
        if let Some(ref guest) = self.player2 {
            players.push(PlayerSummary::from(guest));
        }
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_room() -> Room {
        Room {
            id: "AB12CD".to_string(),
            player1: Player::new("host", true),
            player2: Some(Player::new("guest", false)),
            game_state: GameState::new(),
        }
    }

    #[test]
    fn test_player_lookup_and_opponent() {
        let room = two_player_room();
        assert_eq!(room.player("host").unwrap().id, "host");
        assert_eq!(room.opponent("host").unwrap().id, "guest");
        assert_eq!(room.opponent("guest").unwrap().id, "host");
        assert!(room.player("stranger").is_none());
        assert!(room.opponent("stranger").is_none());
    }

    #[test]
    fn test_roster_is_host_first_and_secret_free() {
        let mut room = two_player_room();
        room.player2.as_mut().unwrap().secret = Some("1234".to_string());

        let roster = room.roster();
        assert_eq!(roster.len(), 2);
        assert!(roster[0].is_host);
        assert_eq!(roster[1].id, "guest");

        let json = serde_json::to_string(&roster).unwrap();
        assert!(!json.contains("1234"));
    }

    #[test]
    fn test_reset_round_keeps_identity() {
        let mut player = Player::new("host", true);
        player.name = Some("Alice".to_string());
        player.secret = Some("1234".to_string());
        player.is_ready = true;
        player.has_won = true;
        player.guesses.push(GuessRecord {
            guess: "5678".to_string(),
            feedback: vec![FeedbackColor::Grey; 4],
        });

        player.reset_round();

        assert_eq!(player.name.as_deref(), Some("Alice"));
        assert!(player.is_host);
        assert!(player.secret.is_none());
        assert!(player.guesses.is_empty());
        assert!(!player.is_ready);
        assert!(!player.has_won);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&FeedbackColor::Green).unwrap(),
            "\"green\""
        );
    }
}
