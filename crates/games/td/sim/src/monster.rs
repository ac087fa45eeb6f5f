use crate::geometry::Point;
use crate::pathing::Path;
use serde::Deserialize;
use std::time::Duration;

/// Monster identity, unique within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonsterId(pub u64);

impl MonsterId {
    /// Ids are `(wave index, position in the wave)` packed into one number, so
    /// they stay unique across waves without a shared counter.
    pub fn new(wave: u32, slot: u32) -> Self {
        Self(((wave as u64) << 32) | slot as u64)
    }
}

/// Catalog entry a monster is created from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MonsterTemplate {
    pub kind: String,
    pub health: i32,
    /// Map units per second.
    pub speed: f32,
    pub reward: u64,
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: String,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    pub reward: u64,
    /// Index of the bound path in the map's path list.
    pub path: usize,
    /// Walking distance covered along the bound path.
    pub travelled: f32,
    pub position: Point,
}

/// Outcome of moving a monster for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved,
    ReachedEnd,
}

impl Monster {
    pub fn spawn(id: MonsterId, template: &MonsterTemplate, path_index: usize, path: &Path) -> Self {
        Self {
            id,
            kind: template.kind.clone(),
            health: template.health,
            max_health: template.health,
            speed: template.speed,
            reward: template.reward,
            path: path_index,
            travelled: 0.0,
            position: path.start(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Walk along `path` for `delta`.
    pub fn advance(&mut self, path: &Path, delta: Duration) -> MoveResult {
        self.travelled += self.speed * delta.as_secs_f32();
        self.position = path.point_at(self.travelled);
        if self.travelled >= path.length() {
            MoveResult::ReachedEnd
        } else {
            MoveResult::Moved
        }
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.health = self.health.saturating_sub(damage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> MonsterTemplate {
        MonsterTemplate {
            kind: "Goblin".to_string(),
            health: 10,
            speed: 2.0,
            reward: 5,
        }
    }

    #[test]
    fn test_ids_are_unique_across_waves() {
        assert_ne!(MonsterId::new(0, 1), MonsterId::new(1, 0));
        assert!(MonsterId::new(0, 7) < MonsterId::new(1, 0));
    }

    #[test]
    fn test_advance_reaches_end() {
        let path = Path::new(vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]).unwrap();
        let mut monster = Monster::spawn(MonsterId::new(0, 0), &template(), 0, &path);
        assert_eq!(monster.position, Point::new(0.0, 0.0));

        assert_eq!(monster.advance(&path, Duration::from_secs(1)), MoveResult::Moved);
        assert_eq!(monster.position, Point::new(2.0, 0.0));

        assert_eq!(
            monster.advance(&path, Duration::from_secs(1)),
            MoveResult::ReachedEnd
        );
        assert_eq!(monster.position, Point::new(4.0, 0.0));
    }

    #[test]
    fn test_damage_kills() {
        let path = Path::new(vec![Point::new(0.0, 0.0)]).unwrap();
        let mut monster = Monster::spawn(MonsterId::new(0, 0), &template(), 0, &path);
        monster.take_damage(4);
        assert!(!monster.is_dead());
        monster.take_damage(6);
        assert!(monster.is_dead());
    }
}
