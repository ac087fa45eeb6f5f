use crate::config::TdConfig;
use crate::game::{GameSession, SessionSetupError};
use crate::monster::MonsterTemplate;
use crate::pathing::{GameMap, MapResource};
use crate::resources::ResourceProvider;
use crate::tower::{TowerSpec, TOWER_CATALOG_PATH};
use crate::wave_generator::{WaveGenerator, MONSTER_CATALOG_PATH};
use std::sync::atomic::{AtomicU64, Ordering};
use td_core::{Player, PlayerClass, UserProfile};

pub const MAP_PATH: &str = "maps/Map.json";
pub const CONFIG_PATH: &str = "config/td.json";

/// Creates sessions from catalogs loaded once at startup.
///
/// Every created session gets its own wave seed, derived from the configured
/// base seed and a running session counter.
pub struct SessionFactory {
    config: TdConfig,
    map: GameMap,
    monsters: Vec<MonsterTemplate>,
    towers: Vec<TowerSpec>,
    created: AtomicU64,
}

impl SessionFactory {
    pub fn new(
        config: TdConfig,
        map: GameMap,
        monsters: Vec<MonsterTemplate>,
        towers: Vec<TowerSpec>,
    ) -> Self {
        Self {
            config,
            map,
            monsters,
            towers,
            created: AtomicU64::new(0),
        }
    }

    /// Load map and catalogs through `resources`.
    ///
    /// Any missing or malformed resource fails the whole load, naming the
    /// offending path and the expected type.
    pub fn load(
        resources: &impl ResourceProvider,
        config: TdConfig,
    ) -> Result<Self, SessionSetupError> {
        let map_resource: MapResource = resources.load_resource(MAP_PATH)?;
        let map = GameMap::from_resource(map_resource)?;
        let monsters = resources.load_resource_list(MONSTER_CATALOG_PATH)?;
        let towers = resources.load_resource_list(TOWER_CATALOG_PATH)?;

        tracing::info!(
            paths = map.paths().len(),
            monsters = monsters.len(),
            towers = towers.len(),
            "loaded session resources"
        );
        Ok(Self::new(config, map, monsters, towers))
    }

    pub fn config(&self) -> &TdConfig {
        &self.config
    }

    pub fn create_session(&self, players: Vec<Player>) -> Result<GameSession, SessionSetupError> {
        let n = self.created.fetch_add(1, Ordering::Relaxed);
        let seed = self.config.seed.wrapping_add(n);
        let generator = WaveGenerator::from_config(self.monsters.clone(), &self.config, seed)?;
        GameSession::new(
            self.config.clone(),
            players,
            self.map.clone(),
            generator,
            self.towers.clone(),
        )
    }

    /// Create a session where every user plays the default class.
    pub fn create_session_for_users(
        &self,
        users: &[UserProfile],
    ) -> Result<GameSession, SessionSetupError> {
        let players = users
            .iter()
            .map(|user| Player::from_user(user, PlayerClass::default()))
            .collect();
        self.create_session(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{MemoryResourceProvider, ResourceError};
    use td_core::Game;

    fn resources() -> MemoryResourceProvider {
        MemoryResourceProvider::new()
            .with(
                MAP_PATH,
                r#"{ "width": 20.0, "height": 10.0,
                     "paths": [[{ "x": 0.0, "y": 5.0 }, { "x": 20.0, "y": 5.0 }]] }"#,
            )
            .with(
                MONSTER_CATALOG_PATH,
                r#"[{ "kind": "Goblin", "health": 10, "speed": 2.0, "reward": 5 }]"#,
            )
            .with(
                TOWER_CATALOG_PATH,
                r#"[{ "kind": "Arrow", "range": 3.0, "damage": 4, "reload_ms": 800 }]"#,
            )
    }

    #[test]
    fn test_loads_and_creates_sessions() {
        let factory = SessionFactory::load(&resources(), TdConfig::default()).unwrap();
        let users = [UserProfile::new(1, "alice"), UserProfile::new(2, "bob")];
        let session = factory.create_session_for_users(&users).unwrap();
        assert_eq!(session.players().len(), 2);
        assert!(session.players().iter().all(|p| p.score == 0));
        assert_eq!(session.wave().index(), 0);
        assert_eq!(session.map().paths().len(), 1);
    }

    #[test]
    fn test_missing_catalog_fails_with_path() {
        let mut resources = resources();
        resources.insert(TOWER_CATALOG_PATH, "[");
        let err = SessionFactory::load(&resources, TdConfig::default())
            .err()
            .unwrap();
        match err {
            SessionSetupError::Resource(ResourceError::Parse { path, .. }) => {
                assert_eq!(path, TOWER_CATALOG_PATH)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_snapshot_is_detached_from_live_state() {
        let factory = SessionFactory::load(&resources(), TdConfig::default()).unwrap();
        let mut session = factory
            .create_session_for_users(&[UserProfile::new(1, "alice")])
            .unwrap();
        let before = session.snapshot();
        session
            .place_tower(1, "Arrow", crate::geometry::Point::new(2.0, 6.0))
            .unwrap();
        session.step(std::time::Duration::from_millis(100)).unwrap();

        assert!(before.towers.is_empty());
        assert_eq!(before.tick, 0);
        let after = session.snapshot();
        assert_eq!(after.towers.len(), 1);
        assert_eq!(after.tick, 1);
        assert_eq!(after.players[0].class, "Engineer");
    }
}
