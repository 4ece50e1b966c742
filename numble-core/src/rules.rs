use numble_types::{GameState, GameStatus, GuessRecord, Player, PlayerId, Room, RoomCode};

use crate::errors::RoomError;
use crate::evaluate::{MAX_GUESSES, evaluate_guess, validate_secret};

/// How a scored guess left the round.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEnd {
    Won { winner_id: PlayerId },
    Draw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuessOutcome {
    pub record: GuessRecord,
    pub attempt: u32,
    pub end: Option<RoundEnd>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisconnectOutcome {
    NotAMember,
    Notice,
    Forfeit { winner_id: PlayerId },
}

/// Builds a fresh room with the creator in the host slot.
pub fn create_room(code: RoomCode, host_id: &str) -> Room {
    Room {
        id: code,
        player1: Player::new(host_id, true),
        player2: None,
        game_state: GameState::new(),
    }
}

/// Seats a second player and moves the room into setup.
pub fn join(room: &mut Room, player_id: &str) -> Result<(), RoomError> {
    if room.is_member(player_id) {
        return Err(RoomError::AlreadyJoined);
    }
    if room.player2.is_some() {
        return Err(RoomError::RoomFull);
    }

    room.player2 = Some(Player::new(player_id, false));
    room.game_state.status = GameStatus::Setup;
    Ok(())
}

/// Records a player's display name and secret and flags them ready.
pub fn set_player_setup(
    room: &mut Room,
    player_id: &str,
    name: &str,
    secret: &str,
) -> Result<(), RoomError> {
    if !room.is_member(player_id) {
        return Err(RoomError::NotInRoom);
    }
    if name.trim().is_empty() {
        return Err(RoomError::EmptyName);
    }
    if !validate_secret(secret) {
        return Err(RoomError::InvalidSecret);
    }

    let player = room.player_mut(player_id).ok_or(RoomError::NotInRoom)?;
    player.name = Some(name.trim().to_string());
    player.secret = Some(secret.to_string());
    player.is_ready = true;
    Ok(())
}

/// Host-only transition from setup to playing once both players are ready.
pub fn start(room: &mut Room, player_id: &str) -> Result<(), RoomError> {
    if !room.is_member(player_id) {
        return Err(RoomError::NotInRoom);
    }
    if room.player1.id != player_id {
        return Err(RoomError::NotHost);
    }
    if room.game_state.status != GameStatus::Setup {
        return Err(RoomError::NotInSetup);
    }

    let both_ready =
        room.player1.is_ready && room.player2.as_ref().is_some_and(|p| p.is_ready);
    if !both_ready {
        return Err(RoomError::PlayersNotReady);
    }

    room.game_state.status = GameStatus::Playing;
    room.game_state.started_at = Some(chrono::Utc::now().to_rfc3339());
    Ok(())
}

/// Scores a guess against the opponent's secret and applies the win or
/// exhaustion-draw transition when the guess resolves the round.
pub fn submit_guess(
    room: &mut Room,
    player_id: &str,
    guess: &str,
) -> Result<GuessOutcome, RoomError> {
    if room.game_state.status != GameStatus::Playing {
        return Err(RoomError::NotPlaying);
    }
    if !room.is_member(player_id) {
        return Err(RoomError::NotInRoom);
    }
    if room
        .player(player_id)
        .is_some_and(|p| p.guesses.len() >= MAX_GUESSES)
    {
        return Err(RoomError::GuessLimitReached);
    }
    if !validate_secret(guess) {
        return Err(RoomError::InvalidGuess);
    }

    let opponent_secret = room
        .opponent(player_id)
        .and_then(|p| p.secret.clone())
        .ok_or(RoomError::NotPlaying)?;

    let record = GuessRecord {
        guess: guess.to_string(),
        feedback: evaluate_guess(guess, &opponent_secret),
    };

    let won = guess == opponent_secret;
    let player = room.player_mut(player_id).ok_or(RoomError::NotInRoom)?;
    player.guesses.push(record.clone());
    let attempt = player.guesses.len() as u32;
    if won {
        player.has_won = true;
    }

    let end = if won {
        room.game_state.status = GameStatus::Finished;
        room.game_state.winner_id = Some(player_id.to_string());
        Some(RoundEnd::Won {
            winner_id: player_id.to_string(),
        })
    } else if exhausted(room) {
        room.game_state.status = GameStatus::Finished;
        Some(RoundEnd::Draw)
    } else {
        None
    };

    Ok(GuessOutcome {
        record,
        attempt,
        end,
    })
}

fn exhausted(room: &Room) -> bool {
    room.player1.guesses.len() >= MAX_GUESSES
        && room
            .player2
            .as_ref()
            .is_some_and(|p| p.guesses.len() >= MAX_GUESSES)
}

/// Resets round-scoped state and re-enters setup. Only a finished room may
/// be reset, which keeps status transitions monotonic within a round.
pub fn rematch(room: &mut Room) -> Result<(), RoomError> {
    if room.game_state.status != GameStatus::Finished {
        return Err(RoomError::NotFinished);
    }

    room.player1.reset_round();
    if let Some(ref mut guest) = room.player2 {
        guest.reset_round();
    }
    room.game_state.status = GameStatus::Setup;
    room.game_state.winner_id = None;
    room.game_state.started_at = None;
    Ok(())
}

/// Flags a player as disconnected. Mid-game disconnects forfeit the round
/// to a still-connected opponent; with nobody left to award the win to,
/// the room keeps its current status.
pub fn mark_disconnected(room: &mut Room, player_id: &str) -> DisconnectOutcome {
    let Some(player) = room.player_mut(player_id) else {
        return DisconnectOutcome::NotAMember;
    };
    player.connected = false;

    if room.game_state.status != GameStatus::Playing {
        return DisconnectOutcome::Notice;
    }

    let opponent_up = room
        .opponent(player_id)
        .map(|p| (p.id.clone(), p.connected));
    match opponent_up {
        Some((winner_id, true)) => {
            if let Some(opponent) = room.player_mut(&winner_id) {
                opponent.has_won = true;
            }
            room.game_state.status = GameStatus::Finished;
            room.game_state.winner_id = Some(winner_id.clone());
            DisconnectOutcome::Forfeit { winner_id }
        }
        _ => DisconnectOutcome::Notice,
    }
}
