use crate::geometry::Point;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("a path needs at least one waypoint")]
    Empty,
    #[error("a map needs at least one path")]
    NoPaths,
}

/// Ordered waypoints a monster walks from first to last.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<Point>,
    /// `cumulative[i]` is the walking distance from the start to `waypoints[i]`.
    cumulative: Vec<f32>,
}

impl Path {
    pub fn new(waypoints: Vec<Point>) -> Result<Self, PathError> {
        if waypoints.is_empty() {
            return Err(PathError::Empty);
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in waypoints.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }

        Ok(Self {
            waypoints,
            cumulative,
        })
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    pub fn start(&self) -> Point {
        self.waypoints[0]
    }

    pub fn end(&self) -> Point {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Total walking distance from the first to the last waypoint.
    pub fn length(&self) -> f32 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Position after walking `travelled` units from the start, clamped to the path.
    pub fn point_at(&self, travelled: f32) -> Point {
        if travelled <= 0.0 {
            return self.start();
        }
        if travelled >= self.length() {
            return self.end();
        }

        // First waypoint whose cumulative distance reaches `travelled`.
        let seg_end = self
            .cumulative
            .partition_point(|&d| d < travelled)
            .min(self.waypoints.len() - 1);
        let seg_start = seg_end - 1;

        let seg_len = self.cumulative[seg_end] - self.cumulative[seg_start];
        if seg_len <= f32::EPSILON {
            return self.waypoints[seg_end];
        }
        let t = (travelled - self.cumulative[seg_start]) / seg_len;
        self.waypoints[seg_start].lerp(self.waypoints[seg_end], t)
    }
}

/// Source of monster paths for a map.
pub trait PathProvider {
    fn generate_path(&mut self) -> Path;
}

/// Hands out the same configured path every time.
#[derive(Clone, Debug)]
pub struct FixedPathProvider {
    path: Path,
}

impl FixedPathProvider {
    pub fn new(waypoints: Vec<Point>) -> Result<Self, PathError> {
        Ok(Self {
            path: Path::new(waypoints)?,
        })
    }
}

impl PathProvider for FixedPathProvider {
    fn generate_path(&mut self) -> Path {
        self.path.clone()
    }
}

/// Map description as stored in resources.
#[derive(Clone, Debug, Deserialize)]
pub struct MapResource {
    pub width: f32,
    pub height: f32,
    pub paths: Vec<Vec<Point>>,
}

/// Static terrain and monster paths. Immutable once a session starts.
#[derive(Clone, Debug)]
pub struct GameMap {
    pub width: f32,
    pub height: f32,
    paths: Vec<Path>,
}

impl GameMap {
    pub fn new(width: f32, height: f32, paths: Vec<Path>) -> Result<Self, PathError> {
        if paths.is_empty() {
            return Err(PathError::NoPaths);
        }
        Ok(Self {
            width,
            height,
            paths,
        })
    }

    /// Build a map whose `path_count` paths come from `provider`.
    pub fn generate(
        width: f32,
        height: f32,
        provider: &mut impl PathProvider,
        path_count: usize,
    ) -> Result<Self, PathError> {
        let paths = (0..path_count).map(|_| provider.generate_path()).collect();
        Self::new(width, height, paths)
    }

    pub fn from_resource(resource: MapResource) -> Result<Self, PathError> {
        let paths = resource
            .paths
            .into_iter()
            .map(Path::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(resource.width, resource.height, paths)
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shaped() -> Path {
        Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert_eq!(Path::new(Vec::new()), Err(PathError::Empty));
    }

    #[test]
    fn test_length_sums_segments() {
        assert_eq!(l_shaped().length(), 15.0);
    }

    #[test]
    fn test_point_at_walks_segments() {
        let path = l_shaped();
        assert_eq!(path.point_at(-1.0), Point::new(0.0, 0.0));
        assert_eq!(path.point_at(4.0), Point::new(4.0, 0.0));
        assert_eq!(path.point_at(10.0), Point::new(10.0, 0.0));
        assert_eq!(path.point_at(12.5), Point::new(10.0, 2.5));
        assert_eq!(path.point_at(100.0), Point::new(10.0, 5.0));
    }

    #[test]
    fn test_single_waypoint_path_has_zero_length() {
        let path = Path::new(vec![Point::new(3.0, 3.0)]).unwrap();
        assert_eq!(path.length(), 0.0);
        assert_eq!(path.point_at(1.0), Point::new(3.0, 3.0));
    }

    #[test]
    fn test_map_needs_a_path() {
        assert!(matches!(
            GameMap::new(10.0, 10.0, Vec::new()),
            Err(PathError::NoPaths)
        ));
    }

    #[test]
    fn test_generate_uses_provider() {
        let mut provider =
            FixedPathProvider::new(vec![Point::new(0.0, 1.0), Point::new(5.0, 1.0)]).unwrap();
        let map = GameMap::generate(10.0, 10.0, &mut provider, 2).unwrap();
        assert_eq!(map.paths().len(), 2);
        assert_eq!(map.paths()[1].end(), Point::new(5.0, 1.0));
        assert!(map.contains(Point::new(10.0, 0.0)));
        assert!(!map.contains(Point::new(10.5, 0.0)));
    }
}
