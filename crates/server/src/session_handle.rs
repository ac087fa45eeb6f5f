use crate::types::SessionId;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use td_core::{Game, Player, PlayerId, TerminalOutcome};
use tokio::sync::{Mutex, MutexGuard};

/// Result of stepping one session for one tick.
#[derive(Debug)]
pub enum StepOutcome<S> {
    /// The session was closed before the tick got to it.
    Skipped,
    Stepped {
        snapshot: S,
        outcome: Option<TerminalOutcome>,
    },
    /// The step returned an error or panicked.
    Faulted(String),
}

/// Thread-safe handle to a session.
///
/// The game sits behind its own mutex, so at most one task steps it at a time.
pub struct SessionHandle<G: Game> {
    id: SessionId,
    players: Arc<[PlayerId]>,
    game: Arc<Mutex<G>>,
    closed: Arc<AtomicBool>,
}

impl<G: Game> Clone for SessionHandle<G> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            players: Arc::clone(&self.players),
            game: Arc::clone(&self.game),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<G: Game> SessionHandle<G> {
    pub fn new(id: SessionId, game: G) -> Self {
        let players = game.players().iter().map(|p| p.id).collect();
        Self {
            id,
            players,
            game: Arc::new(Mutex::new(game)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Ids of the players of this session. Fixed at creation.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the session closed.
    ///
    /// Waits for a step in progress to complete; no step runs afterwards.
    pub async fn close(&self) {
        let _game = self.game.lock().await;
        self.closed.store(true, Ordering::Release);
    }

    /// Lock the game for direct access, e.g. to place towers.
    pub async fn lock(&self) -> MutexGuard<'_, G> {
        self.game.lock().await
    }

    pub async fn snapshot(&self) -> G::Snapshot {
        self.game.lock().await.snapshot()
    }

    /// Current players with their scores.
    pub async fn player_states(&self) -> Vec<Player> {
        self.game.lock().await.players().to_vec()
    }

    /// Advance the game by `delta`.
    ///
    /// Panics inside the game are caught and reported as a fault.
    pub async fn step(&self, delta: Duration) -> StepOutcome<G::Snapshot> {
        let mut guard = self.game.lock().await;
        if self.is_closed() {
            return StepOutcome::Skipped;
        }

        let game = &mut *guard;
        match panic::catch_unwind(AssertUnwindSafe(|| game.step(delta))) {
            Ok(Ok(())) => StepOutcome::Stepped {
                snapshot: game.snapshot(),
                outcome: game.is_terminal(),
            },
            Ok(Err(err)) => StepOutcome::Faulted(err.to_string()),
            Err(payload) => StepOutcome::Faulted(panic_message(payload.as_ref())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
