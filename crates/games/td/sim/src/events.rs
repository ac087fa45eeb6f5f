use crate::monster::MonsterId;
use crate::tower::TowerId;
use td_core::PlayerId;

/// A tower firing at a monster. Only lives for the tick that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShotEvent {
    pub monster_id: MonsterId,
    pub tower_id: TowerId,
    /// Milliseconds since session start.
    pub offset: u64,
}

/// Notable things that happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum TdEvent {
    TowerPlaced {
        id: TowerId,
        owner: PlayerId,
    },
    MonsterSpawned {
        id: MonsterId,
        path: usize,
    },
    MonsterKilled {
        id: MonsterId,
        tower: TowerId,
        owner: PlayerId,
        reward: u64,
    },
    MonsterEscaped {
        id: MonsterId,
    },
    WaveStarted {
        wave: u32,
    },
    WaveCleared {
        wave: u32,
    },
}
