use crate::errors::TransportError;
use crate::types::CloseStatus;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use td_core::PlayerId;
use td_types::ServerMessage;

/// Delivery of session messages to connected players.
///
/// Encoding and framing belong to the implementation; the service only hands
/// over typed messages. Calls are expected to return quickly.
pub trait Transport<S>: Send + Sync + 'static {
    fn is_connected(&self, player: PlayerId) -> bool;

    fn send_message_to_user(
        &self,
        player: PlayerId,
        message: &ServerMessage<S>,
    ) -> Result<(), TransportError>;

    fn close_session(&self, player: PlayerId, status: CloseStatus);
}

struct TransportState<S> {
    connected: HashSet<PlayerId>,
    failing: HashSet<PlayerId>,
    sent: Vec<(PlayerId, ServerMessage<S>)>,
    closed: HashMap<PlayerId, CloseStatus>,
}

/// Transport that keeps everything in memory.
///
/// Records every delivered message and close, and can be told to drop a
/// connection or to fail sends for a player.
pub struct InMemoryTransport<S> {
    state: Mutex<TransportState<S>>,
}

impl<S> Default for InMemoryTransport<S> {
    fn default() -> Self {
        Self {
            state: Mutex::new(TransportState {
                connected: HashSet::new(),
                failing: HashSet::new(),
                sent: Vec::new(),
                closed: HashMap::new(),
            }),
        }
    }
}

impl<S: Clone> InMemoryTransport<S> {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, TransportState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a connection for `player`, clearing any earlier close.
    pub fn connect(&self, player: PlayerId) {
        let mut state = self.state();
        state.connected.insert(player);
        state.closed.remove(&player);
    }

    /// Drop the connection without a close handshake.
    pub fn disconnect(&self, player: PlayerId) {
        self.state().connected.remove(&player);
    }

    /// Make every following send to `player` fail with an IO error.
    pub fn fail_sends_to(&self, player: PlayerId) {
        self.state().failing.insert(player);
    }

    pub fn messages_for(&self, player: PlayerId) -> Vec<ServerMessage<S>> {
        self.state()
            .sent
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.state().sent.len()
    }

    /// Status the connection of `player` was closed with, if it was.
    pub fn close_status(&self, player: PlayerId) -> Option<CloseStatus> {
        self.state().closed.get(&player).copied()
    }
}

impl<S: Clone + Send + 'static> Transport<S> for InMemoryTransport<S> {
    fn is_connected(&self, player: PlayerId) -> bool {
        self.state().connected.contains(&player)
    }

    fn send_message_to_user(
        &self,
        player: PlayerId,
        message: &ServerMessage<S>,
    ) -> Result<(), TransportError> {
        let mut state = self.state();
        if !state.connected.contains(&player) {
            return Err(TransportError::NotConnected(player));
        }
        if state.failing.contains(&player) {
            return Err(TransportError::Io {
                player,
                message: "broken pipe".to_string(),
            });
        }
        state.sent.push((player, message.clone()));
        Ok(())
    }

    fn close_session(&self, player: PlayerId, status: CloseStatus) {
        let mut state = self.state();
        state.connected.remove(&player);
        state.closed.insert(player, status);
    }
}
