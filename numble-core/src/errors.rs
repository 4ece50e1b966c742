use thiserror::Error;

/// Rejection reasons for room actions. The server decides per variant
/// whether to surface a unicast error event or drop the action silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,
    #[error("Already in this room")]
    AlreadyJoined,
    #[error("Invalid secret number")]
    InvalidSecret,
    #[error("Invalid guess")]
    InvalidGuess,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Only the host can start the game")]
    NotHost,
    #[error("Both players must be ready")]
    PlayersNotReady,
    #[error("Room is not in setup")]
    NotInSetup,
    #[error("Game is not in progress")]
    NotPlaying,
    #[error("No guesses remaining")]
    GuessLimitReached,
    #[error("Game is not finished")]
    NotFinished,
    #[error("Player is not in this room")]
    NotInRoom,
}
