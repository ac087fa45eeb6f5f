use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use td_core::{PlayerId, Score};

/// Persistent store of player scores, keyed by user id.
pub trait ScoreStore: Send + Sync + 'static {
    /// Add the score of a finished session to the player's total.
    fn add_score(&self, player: PlayerId, score: Score);
}

#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    totals: Mutex<HashMap<PlayerId, Score>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self, player: PlayerId) -> Option<Score> {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player)
            .copied()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn add_score(&self, player: PlayerId, score: Score) {
        let mut totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        let total = totals.entry(player).or_insert(0);
        *total = total.saturating_add(score);
    }
}
