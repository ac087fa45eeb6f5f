use std::fmt;
use std::time::Duration;
use td_core::PlayerId;

slotmap::new_key_type! {
    /// Identifies a live session in the registry.
    pub struct SessionId;
}

/// Reason given to the transport when a player's connection is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CloseStatus {
    /// The session finished and results were delivered.
    Normal,
    /// The session was abandoned, e.g. a player disconnected or the server stops.
    GoingAway,
    /// Delivery failed or the session faulted.
    ServerError,
}

impl fmt::Display for CloseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseStatus::Normal => write!(f, "normal"),
            CloseStatus::GoingAway => write!(f, "going away"),
            CloseStatus::ServerError => write!(f, "server error"),
        }
    }
}

/// Information about a live session.
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub players: Vec<PlayerId>,
}

/// Configuration for the session service and its executor.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Nominal time between two executor ticks.
    pub step_interval: Duration,
    /// Maximum number of concurrent sessions.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(100),
            max_sessions: 100,
        }
    }
}
