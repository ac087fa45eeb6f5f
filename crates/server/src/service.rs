use crate::errors::{SessionError, StartGameError};
use crate::executor::{ExecutorHandle, GameExecutor};
use crate::scores::ScoreStore;
use crate::session_handle::{SessionHandle, StepOutcome};
use crate::transport::Transport;
use crate::types::{CloseStatus, ServerConfig, SessionId, SessionInfo};
use slotmap::SlotMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use td_core::{Game, PlayerId};
use td_types::{GameFinishMessage, ServerMessage};
use tokio::sync::RwLock;

/// Live sessions plus the player index into them.
///
/// Both maps are only ever changed together, under the service's write lock.
struct SessionTable<G: Game> {
    sessions: SlotMap<SessionId, SessionHandle<G>>,
    players: HashMap<PlayerId, SessionId>,
}

impl<G: Game> SessionTable<G> {
    fn new() -> Self {
        Self {
            sessions: SlotMap::with_key(),
            players: HashMap::new(),
        }
    }

    /// Remove a session and every player mapping pointing at it.
    fn remove(&mut self, id: SessionId) -> Option<SessionHandle<G>> {
        let handle = self.sessions.remove(id)?;
        for player in handle.players() {
            if self.players.get(player) == Some(&id) {
                self.players.remove(player);
            }
        }
        Some(handle)
    }
}

/// Registry of running sessions.
///
/// Enforces one active session per player and drives the start, terminate and
/// finish lifecycle against the transport and the score store.
pub struct GameSessionService<G: Game, T, S> {
    pub config: ServerConfig,
    table: RwLock<SessionTable<G>>,
    transport: Arc<T>,
    scores: Arc<S>,
}

impl<G, T, S> GameSessionService<G, T, S>
where
    G: Game,
    T: Transport<G::Snapshot>,
    S: ScoreStore,
{
    pub fn new(config: ServerConfig, transport: Arc<T>, scores: Arc<S>) -> Self {
        Self {
            config,
            table: RwLock::new(SessionTable::new()),
            transport,
            scores,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Register `game` and deliver its initial state to every player.
    ///
    /// Fails without side effects if any player is already playing. If the
    /// initial state cannot be delivered to some player, the session and all of
    /// its player mappings are removed again.
    pub async fn start_game(&self, game: G) -> Result<SessionId, StartGameError> {
        let initial = ServerMessage::InitialState(game.snapshot());
        let mut table = self.table.write().await;

        if let Some(player) = game
            .players()
            .iter()
            .map(|p| p.id)
            .find(|id| table.players.contains_key(id))
        {
            tracing::warn!(player, "start rejected: player already in a session");
            return Err(StartGameError::AlreadyPlaying(player));
        }
        if table.sessions.len() >= self.config.max_sessions {
            return Err(StartGameError::TooManySessions);
        }

        let id = table
            .sessions
            .insert_with_key(|id| SessionHandle::new(id, game));
        let players = table.sessions[id].players().to_vec();
        for &player in &players {
            table.players.insert(player, id);
        }

        for &player in &players {
            if let Err(source) = self.transport.send_message_to_user(player, &initial) {
                tracing::error!(
                    session = ?id,
                    player,
                    error = %source,
                    "initial state delivery failed, rolling back"
                );
                if let Some(handle) = table.remove(id) {
                    handle.close().await;
                }
                return Err(StartGameError::Delivery { player, source });
            }
        }

        tracing::info!(session = ?id, players = ?players, "session started");
        Ok(id)
    }

    pub async fn is_playing(&self, player: PlayerId) -> bool {
        self.table.read().await.players.contains_key(&player)
    }

    /// True if the session exists and every one of its players is connected.
    pub async fn is_valid_session(&self, id: SessionId) -> bool {
        let table = self.table.read().await;
        match table.sessions.get(id) {
            Some(handle) => self.all_connected(handle),
            None => false,
        }
    }

    fn all_connected(&self, handle: &SessionHandle<G>) -> bool {
        handle
            .players()
            .iter()
            .all(|&player| self.transport.is_connected(player))
    }

    pub async fn get_session_for_user(&self, player: PlayerId) -> Option<SessionHandle<G>> {
        let table = self.table.read().await;
        let id = table.players.get(&player)?;
        table.sessions.get(*id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.table.read().await.sessions.len()
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let table = self.table.read().await;
        table
            .sessions
            .iter()
            .map(|(session_id, handle)| SessionInfo {
                session_id,
                players: handle.players().to_vec(),
            })
            .collect()
    }

    async fn take(&self, id: SessionId) -> Result<SessionHandle<G>, SessionError> {
        let handle = self.table.write().await.remove(id).ok_or(SessionError::NotFound)?;
        handle.close().await;
        Ok(handle)
    }

    /// Abort a session: close every player's connection with `status`.
    /// Scores are not persisted.
    pub async fn terminate_session(
        &self,
        id: SessionId,
        status: CloseStatus,
    ) -> Result<(), SessionError> {
        let handle = self.take(id).await?;
        for &player in handle.players() {
            self.transport.close_session(player, status);
        }
        tracing::info!(session = ?id, %status, "session terminated");
        Ok(())
    }

    /// Complete a session: persist every player's score, then deliver the
    /// finish message and close normally, or close with an error if delivery
    /// fails. The session is gone afterwards whatever the delivery outcome.
    pub async fn finish_game(&self, id: SessionId) -> Result<(), SessionError> {
        let handle = self.take(id).await?;

        for player in handle.player_states().await {
            self.scores.add_score(player.id, player.score);
            let finish = ServerMessage::Finish(GameFinishMessage {
                score: player.score,
            });
            match self.transport.send_message_to_user(player.id, &finish) {
                Ok(()) => self.transport.close_session(player.id, CloseStatus::Normal),
                Err(err) => {
                    tracing::warn!(
                        session = ?id,
                        player = player.id,
                        error = %err,
                        "finish delivery failed"
                    );
                    self.transport
                        .close_session(player.id, CloseStatus::ServerError);
                }
            }
        }

        tracing::info!(session = ?id, "session finished");
        Ok(())
    }

    /// Advance every live session by `delta` and broadcast the snapshots.
    ///
    /// Sessions with a disconnected player are terminated. A session whose step
    /// fails is terminated with [`CloseStatus::ServerError`] without affecting
    /// the others. Sessions that reached a terminal outcome are finished. The
    /// result of a tick that overlaps the session's removal is never sent.
    pub async fn step_sessions(&self, delta: Duration) {
        let handles: Vec<SessionHandle<G>> =
            self.table.read().await.sessions.values().cloned().collect();

        for handle in handles {
            let id = handle.id();
            if !self.all_connected(&handle) {
                tracing::info!(session = ?id, "player disconnected, abandoning session");
                let _ = self.terminate_session(id, CloseStatus::GoingAway).await;
                continue;
            }

            match handle.step(delta).await {
                StepOutcome::Skipped => {}
                StepOutcome::Faulted(error) => {
                    tracing::error!(session = ?id, %error, "session step failed");
                    let _ = self.terminate_session(id, CloseStatus::ServerError).await;
                }
                StepOutcome::Stepped { snapshot, outcome } => {
                    if !self.publish_snapshot(&handle, snapshot).await {
                        tracing::debug!(session = ?id, "session removed mid-tick, result discarded");
                        continue;
                    }
                    if let Some(outcome) = outcome {
                        tracing::debug!(session = ?id, ?outcome, "session reached terminal state");
                        let _ = self.finish_game(id).await;
                    }
                }
            }
        }
    }

    /// Broadcast a tick's snapshot if the session is still registered.
    ///
    /// Runs under the table read lock, so it cannot interleave with the removal
    /// done by terminate or finish.
    async fn publish_snapshot(&self, handle: &SessionHandle<G>, snapshot: G::Snapshot) -> bool {
        let table = self.table.read().await;
        if !table.sessions.contains_key(handle.id()) {
            return false;
        }

        let message = ServerMessage::Snapshot(snapshot);
        for &player in handle.players() {
            if let Err(err) = self.transport.send_message_to_user(player, &message) {
                tracing::warn!(
                    session = ?handle.id(),
                    player,
                    error = %err,
                    "snapshot delivery failed"
                );
            }
        }
        true
    }

    /// Terminate every session.
    pub async fn shutdown(&self) {
        let ids: Vec<SessionId> = self.table.read().await.sessions.keys().collect();
        for id in ids {
            let _ = self.terminate_session(id, CloseStatus::GoingAway).await;
        }
    }

    /// Spawn an executor that calls [`Self::step_sessions`] every
    /// `config.step_interval`.
    pub fn spawn_executor(self: &Arc<Self>) -> ExecutorHandle {
        let service = Arc::clone(self);
        GameExecutor::new(self.config.step_interval).spawn(move |delta| {
            let service = Arc::clone(&service);
            async move { service.step_sessions(delta).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_remove_keeps_foreign_mappings() {
        let mut table: SessionTable<DummyGame> = SessionTable::new();
        let a = table
            .sessions
            .insert_with_key(|id| SessionHandle::new(id, DummyGame::with(&[1, 2])));
        let b = table
            .sessions
            .insert_with_key(|id| SessionHandle::new(id, DummyGame::with(&[3])));
        table.players.insert(1, a);
        table.players.insert(2, b);
        table.players.insert(3, b);

        assert!(table.remove(a).is_some());
        assert!(!table.players.contains_key(&1));
        assert_eq!(table.players.get(&2), Some(&b));
        assert!(table.remove(a).is_none());
    }

    struct DummyGame {
        players: Vec<td_core::Player>,
    }

    impl DummyGame {
        fn with(ids: &[PlayerId]) -> Self {
            Self {
                players: ids
                    .iter()
                    .map(|&id| {
                        td_core::Player::from_user(
                            &td_core::UserProfile::new(id, format!("p{id}")),
                            td_core::PlayerClass::default(),
                        )
                    })
                    .collect(),
            }
        }
    }

    impl Game for DummyGame {
        type Snapshot = ();
        type Error = std::convert::Infallible;

        fn step(&mut self, _delta: Duration) -> Result<(), Self::Error> {
            Ok(())
        }

        fn snapshot(&self) -> Self::Snapshot {}

        fn players(&self) -> &[td_core::Player] {
            &self.players
        }

        fn is_terminal(&self) -> Option<td_core::TerminalOutcome> {
            None
        }
    }
}
