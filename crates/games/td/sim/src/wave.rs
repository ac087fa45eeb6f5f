use crate::monster::{Monster, MonsterId};
use std::collections::VecDeque;
use std::time::Duration;

/// A monster waiting for its release time.
#[derive(Clone, Debug)]
pub struct SpawnEntry {
    pub monster: Monster,
    /// Release time, measured from wave start.
    pub offset: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Monsters are still pending release.
    Spawning,
    /// All monsters are released and some are still on the map.
    Active,
    /// Every monster died or escaped.
    Cleared,
}

/// One escalation round: a spawn schedule plus the monsters already released.
#[derive(Clone, Debug)]
pub struct Wave {
    index: u32,
    pending: VecDeque<SpawnEntry>,
    running: Vec<Monster>,
    clock: Duration,
}

impl Wave {
    pub fn new(index: u32, mut schedule: Vec<SpawnEntry>) -> Self {
        schedule.sort_by_key(|entry| entry.offset);
        Self {
            index,
            pending: schedule.into(),
            running: Vec::new(),
            clock: Duration::ZERO,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Time since the wave started.
    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    pub fn pending(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn running(&self) -> &[Monster] {
        &self.running
    }

    pub fn running_mut(&mut self) -> &mut [Monster] {
        &mut self.running
    }

    pub fn phase(&self) -> WavePhase {
        if !self.pending.is_empty() {
            WavePhase::Spawning
        } else if !self.running.is_empty() {
            WavePhase::Active
        } else {
            WavePhase::Cleared
        }
    }

    /// Advance the wave clock by `delta` and release the next monster if it is due.
    ///
    /// At most one monster is released per call; a backlog drains one per tick.
    pub fn tick(&mut self, delta: Duration) -> Option<MonsterId> {
        self.clock += delta;
        let due = self
            .pending
            .front()
            .is_some_and(|entry| entry.offset <= self.clock);
        if !due {
            return None;
        }
        let entry = self.pending.pop_front()?;
        let id = entry.monster.id;
        self.running.push(entry.monster);
        Some(id)
    }

    pub fn remove_running(&mut self, id: MonsterId) -> Option<Monster> {
        let idx = self.running.iter().position(|m| m.id == id)?;
        Some(self.running.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::monster::MonsterTemplate;
    use crate::pathing::Path;

    fn entry(slot: u32, offset_ms: u64) -> SpawnEntry {
        let path = Path::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        let template = MonsterTemplate {
            kind: "Goblin".to_string(),
            health: 10,
            speed: 1.0,
            reward: 1,
        };
        SpawnEntry {
            monster: Monster::spawn(MonsterId::new(0, slot), &template, 0, &path),
            offset: Duration::from_millis(offset_ms),
        }
    }

    #[test]
    fn test_releases_in_offset_order() {
        let mut wave = Wave::new(0, vec![entry(1, 600), entry(0, 100)]);
        assert_eq!(wave.phase(), WavePhase::Spawning);

        assert_eq!(wave.tick(Duration::from_millis(50)), None);
        assert_eq!(wave.tick(Duration::from_millis(50)), Some(MonsterId::new(0, 0)));
        assert_eq!(wave.tick(Duration::from_millis(100)), None);
        assert_eq!(wave.tick(Duration::from_millis(400)), Some(MonsterId::new(0, 1)));
        assert_eq!(wave.phase(), WavePhase::Active);
        assert_eq!(wave.running().len(), 2);
    }

    #[test]
    fn test_at_most_one_release_per_tick() {
        let mut wave = Wave::new(0, vec![entry(0, 0), entry(1, 0), entry(2, 0)]);
        assert!(wave.tick(Duration::from_secs(5)).is_some());
        assert_eq!(wave.running().len(), 1);
        assert_eq!(wave.pending_len(), 2);
        assert!(wave.tick(Duration::ZERO).is_some());
        assert_eq!(wave.running().len(), 2);
    }

    #[test]
    fn test_cleared_once_everything_is_removed() {
        let mut wave = Wave::new(3, vec![entry(0, 0)]);
        wave.tick(Duration::ZERO);
        assert!(wave.remove_running(MonsterId::new(0, 0)).is_some());
        assert!(wave.remove_running(MonsterId::new(0, 0)).is_none());
        assert_eq!(wave.phase(), WavePhase::Cleared);
        assert_eq!(wave.index(), 3);
    }
}
