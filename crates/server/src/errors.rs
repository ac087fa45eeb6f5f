use std::fmt;
use td_core::PlayerId;

/// Error from a transport send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The player has no open connection.
    NotConnected(PlayerId),
    /// The connection failed while writing.
    Io { player: PlayerId, message: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotConnected(player) => write!(f, "player {player} is not connected"),
            TransportError::Io { player, message } => {
                write!(f, "failed to send to player {player}: {message}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Error when starting a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartGameError {
    /// A player is already in an active session. Nothing was registered.
    AlreadyPlaying(PlayerId),
    /// Maximum number of concurrent sessions reached.
    TooManySessions,
    /// The initial state could not be delivered; the registration was rolled back.
    Delivery {
        player: PlayerId,
        source: TransportError,
    },
}

impl fmt::Display for StartGameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartGameError::AlreadyPlaying(player) => {
                write!(f, "player {player} is already playing")
            }
            StartGameError::TooManySessions => write!(f, "maximum number of sessions reached"),
            StartGameError::Delivery { player, source } => {
                write!(f, "initial state delivery to player {player} failed: {source}")
            }
        }
    }
}

impl std::error::Error for StartGameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartGameError::Delivery { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error for operations on a specific session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session not found.
    NotFound,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotFound => write!(f, "session not found"),
        }
    }
}

impl std::error::Error for SessionError {}
