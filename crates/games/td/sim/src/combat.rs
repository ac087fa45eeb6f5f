//! Tower-versus-monster resolution for one tick.
//!
//! Shots are collected for every tower before any damage is applied, so the
//! outcome does not depend on which tower happened to be resolved first.

use crate::area::Area;
use crate::events::ShotEvent;
use crate::monster::{Monster, MonsterId};
use crate::tower::{Tower, TowerId};
use crate::wave::Wave;
use slotmap::SlotMap;
use std::time::Duration;
use td_core::PlayerId;

/// A monster removed by tower fire, with the tower credited for it.
#[derive(Clone, Debug)]
pub struct Kill {
    pub monster: Monster,
    pub tower: TowerId,
    pub owner: PlayerId,
}

/// Detect collisions between running monsters and tower areas, let every tower
/// with something in range fire, then clear all areas.
pub fn process_tower_shooting(
    running: &[Monster],
    areas: &mut [Area],
    towers: &mut SlotMap<TowerId, Tower>,
    offset: u64,
) -> Vec<ShotEvent> {
    for monster in running {
        for area in areas.iter_mut() {
            area.add_if_collision(monster);
        }
    }

    let shots = areas
        .iter()
        .filter(|area| !area.is_empty())
        .filter_map(|area| {
            let id = area.tower();
            towers.get_mut(id)?.fire(id, area, offset)
        })
        .collect();

    areas.iter_mut().for_each(Area::clear);
    shots
}

/// Let `delta` of reload time pass for every tower.
pub fn reload_towers(towers: &mut SlotMap<TowerId, Tower>, delta: Duration) {
    for tower in towers.values_mut() {
        tower.reload(delta);
    }
}

/// Apply the damage of `shots` in order and remove the monsters that died.
///
/// A monster is credited to the tower whose shot brought it down; shots that
/// land on a monster already killed this tick do nothing.
pub fn apply_shots(
    shots: &[ShotEvent],
    towers: &SlotMap<TowerId, Tower>,
    wave: &mut Wave,
) -> Vec<Kill> {
    let mut killed: Vec<(MonsterId, TowerId, PlayerId)> = Vec::new();

    for shot in shots {
        let Some(tower) = towers.get(shot.tower_id) else {
            continue;
        };
        let Some(monster) = wave
            .running_mut()
            .iter_mut()
            .find(|m| m.id == shot.monster_id)
        else {
            continue;
        };
        if monster.is_dead() {
            continue;
        }

        monster.take_damage(tower.damage);
        if monster.is_dead() {
            killed.push((monster.id, shot.tower_id, tower.owner));
        }
    }

    killed
        .into_iter()
        .filter_map(|(monster_id, tower, owner)| {
            wave.remove_running(monster_id).map(|monster| Kill {
                monster,
                tower,
                owner,
            })
        })
        .collect()
}
