//! Canonical serializable records produced by the tower-defense session engine.
//!
//! These are plain values: they never borrow from, or share storage with, the
//! live simulation, so a transport can encode them while the next tick runs.

use serde::{Deserialize, Serialize};

/// Position on the map, in map units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Current wave progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WavePhaseInfo {
    /// Monsters are still waiting to be released.
    Spawning { pending: u32, running: u32 },
    /// Every monster is released, some are still alive.
    Active { running: u32 },
    /// Every monster died or escaped.
    Cleared,
}

/// A tower firing at a monster during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotEventSnapshot {
    pub monster_id: u64,
    pub tower_id: u64,
    /// Milliseconds since session start at which the shot happened.
    pub offset: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub name: String,
    pub class: String,
    pub score: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterSnapshot {
    pub id: u64,
    pub kind: String,
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
    pub path: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    pub id: u64,
    pub owner: u64,
    pub kind: String,
    pub position: Position,
    pub range: f32,
    /// Remaining reload time in milliseconds.
    pub cooldown_ms: u64,
}

/// Full state of one session after a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub tick: u64,
    /// Simulated milliseconds since session start.
    pub elapsed_ms: u64,
    pub wave: u32,
    pub wave_phase: WavePhaseInfo,
    pub leaks: u32,
    pub max_leaks: u32,
    pub players: Vec<PlayerSnapshot>,
    pub monsters: Vec<MonsterSnapshot>,
    pub towers: Vec<TowerSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shots: Vec<ShotEventSnapshot>,
}

/// Final per-player result sent when a game finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFinishMessage {
    pub score: u64,
}

/// Everything the session engine asks a transport to deliver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage<S> {
    InitialState(S),
    Snapshot(S),
    Finish(GameFinishMessage),
}

impl<S> ServerMessage<S> {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::InitialState(_) => "initial_state",
            ServerMessage::Snapshot(_) => "snapshot",
            ServerMessage::Finish(_) => "finish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_message_is_tagged() {
        let msg: ServerMessage<SessionSnapshot> =
            ServerMessage::Finish(GameFinishMessage { score: 42 });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "Finish");
        assert_eq!(json["payload"]["score"], 42);
    }

    #[test]
    fn test_empty_shots_are_omitted() {
        let snapshot = SessionSnapshot {
            tick: 1,
            elapsed_ms: 100,
            wave: 0,
            wave_phase: WavePhaseInfo::Cleared,
            leaks: 0,
            max_leaks: 10,
            players: Vec::new(),
            monsters: Vec::new(),
            towers: Vec::new(),
            shots: Vec::new(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("shots").is_none());

        let back: SessionSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
