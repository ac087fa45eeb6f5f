use crate::player::Player;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Win,
    Lose,
}

/// A real-time match that can be driven by the session service.
///
/// `step` is not reentrant: callers must guarantee exclusive access, which the
/// server does by keeping every game behind its own mutex.
pub trait Game: Send + Sized + 'static {
    type Snapshot: Clone + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Advance the simulation by `delta` of real elapsed time.
    fn step(&mut self, delta: Duration) -> Result<(), Self::Error>;

    /// Materialize an independent copy of the state for broadcast.
    fn snapshot(&self) -> Self::Snapshot;

    fn players(&self) -> &[Player];

    fn is_terminal(&self) -> Option<TerminalOutcome>;
}
