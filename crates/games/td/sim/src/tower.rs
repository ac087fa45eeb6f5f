use crate::area::Area;
use crate::events::ShotEvent;
use crate::geometry::Point;
use serde::Deserialize;
use slotmap::{new_key_type, Key};
use std::time::Duration;
use td_core::PlayerId;

new_key_type! { pub struct TowerId; }

pub const TOWER_CATALOG_PATH: &str = "towers/TowersList.json";

/// Stable numeric form of a tower id for snapshots.
pub fn tower_id_to_u64(id: TowerId) -> u64 {
    id.data().as_ffi()
}

/// Catalog entry a tower is built from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TowerSpec {
    pub kind: String,
    pub range: f32,
    pub damage: i32,
    pub reload_ms: u64,
}

#[derive(Clone, Debug)]
pub struct Tower {
    pub owner: PlayerId,
    pub kind: String,
    pub position: Point,
    pub range: f32,
    pub damage: i32,
    pub reload: Duration,
    /// Time left until the tower may fire again.
    pub cooldown: Duration,
}

impl Tower {
    pub fn new(owner: PlayerId, spec: &TowerSpec, position: Point) -> Self {
        Self {
            owner,
            kind: spec.kind.clone(),
            position,
            range: spec.range,
            damage: spec.damage,
            reload: Duration::from_millis(spec.reload_ms),
            cooldown: Duration::ZERO,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cooldown.is_zero()
    }

    /// Let `delta` of reload time pass, floored at zero.
    pub fn reload(&mut self, delta: Duration) {
        self.cooldown = self.cooldown.saturating_sub(delta);
    }

    /// Shoot at the best target in `area` if the tower is loaded.
    ///
    /// The target is the monster furthest along its path; equal progress goes
    /// to the lower monster id.
    pub fn fire(&mut self, id: TowerId, area: &Area, offset: u64) -> Option<ShotEvent> {
        if !self.is_loaded() {
            return None;
        }

        let target = area.overlapping().iter().min_by(|a, b| {
            b.progress
                .total_cmp(&a.progress)
                .then_with(|| a.monster.cmp(&b.monster))
        })?;

        self.cooldown = self.reload;
        Some(ShotEvent {
            monster_id: target.monster,
            tower_id: id,
            offset,
        })
    }
}
