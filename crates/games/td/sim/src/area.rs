use crate::geometry::Point;
use crate::monster::{Monster, MonsterId};
use crate::tower::TowerId;

/// A monster seen inside an area during the current collision pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub monster: MonsterId,
    /// Distance walked along the monster's path.
    pub progress: f32,
}

/// Detection region of one tower.
///
/// Holds what the current collision pass found and nothing else; it must be
/// cleared before the next pass.
#[derive(Clone, Debug)]
pub struct Area {
    tower: TowerId,
    center: Point,
    radius: f32,
    overlapping: Vec<Target>,
}

impl Area {
    pub fn new(tower: TowerId, center: Point, radius: f32) -> Self {
        Self {
            tower,
            center,
            radius,
            overlapping: Vec::new(),
        }
    }

    pub fn tower(&self) -> TowerId {
        self.tower
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        self.center.distance_sq(point) <= self.radius * self.radius
    }

    /// Register `monster` for this pass if it lies within range.
    pub fn add_if_collision(&mut self, monster: &Monster) -> bool {
        if !self.contains(monster.position) {
            return false;
        }
        self.push(Target {
            monster: monster.id,
            progress: monster.travelled,
        });
        true
    }

    pub(crate) fn push(&mut self, target: Target) {
        self.overlapping.push(target);
    }

    pub fn overlapping(&self) -> &[Target] {
        &self.overlapping
    }

    pub fn len(&self) -> usize {
        self.overlapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlapping.is_empty()
    }

    pub fn clear(&mut self) {
        self.overlapping.clear();
    }
}
