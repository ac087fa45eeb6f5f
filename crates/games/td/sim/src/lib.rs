pub mod area;
pub mod combat;
pub mod config;
pub mod events;
pub mod factory;
pub mod game;
pub mod geometry;
pub mod monster;
pub mod observe;
pub mod pathing;
pub mod resources;
pub mod tower;
pub mod wave;
pub mod wave_generator;

pub use area::Area;
pub use config::TdConfig;
pub use events::{ShotEvent, TdEvent};
pub use factory::SessionFactory;
pub use game::{GameSession, PlacementError, SessionSetupError, StepError};
pub use geometry::Point;
pub use monster::{Monster, MonsterId, MonsterTemplate};
pub use pathing::{FixedPathProvider, GameMap, Path, PathProvider};
pub use resources::{JsonResourceProvider, MemoryResourceProvider, ResourceError, ResourceProvider};
pub use tower::{Tower, TowerId, TowerSpec};
pub use wave::{Wave, WavePhase};
pub use wave_generator::{WaveGenerator, WaveGeneratorError};
