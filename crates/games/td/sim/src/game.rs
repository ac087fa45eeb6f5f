use crate::area::Area;
use crate::combat;
use crate::config::TdConfig;
use crate::events::{ShotEvent, TdEvent};
use crate::geometry::Point;
use crate::monster::MoveResult;
use crate::pathing::{GameMap, PathError};
use crate::resources::ResourceError;
use crate::tower::{Tower, TowerId, TowerSpec};
use crate::wave::{Wave, WavePhase};
use crate::wave_generator::{WaveGenerator, WaveGeneratorError};
use slotmap::SlotMap;
use std::collections::HashSet;
use std::time::Duration;
use td_core::{Game, Player, PlayerId, TerminalOutcome, Tick};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionSetupError {
    #[error("a session needs at least one player")]
    NoPlayers,
    #[error("player {0} listed twice")]
    DuplicatePlayer(PlayerId),
    #[error("tower catalog is empty")]
    EmptyTowerCatalog,
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Waves(#[from] WaveGeneratorError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("player {0} is not part of this session")]
    UnknownPlayer(PlayerId),
    #[error("unknown tower kind `{0}`")]
    UnknownKind(String),
    #[error("position ({x}, {y}) is outside the map")]
    OutOfMap { x: f32, y: f32 },
    #[error("too close to another tower")]
    TooClose,
    #[error("session is over")]
    SessionOver,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("failed to generate wave {wave}: {source}")]
    WaveGeneration {
        wave: u32,
        #[source]
        source: WaveGeneratorError,
    },
}

/// One tower-defense match: players, towers, map and the running wave.
pub struct GameSession {
    config: TdConfig,
    players: Vec<Player>,
    map: GameMap,
    tower_catalog: Vec<TowerSpec>,
    towers: SlotMap<TowerId, Tower>,
    areas: Vec<Area>,
    generator: WaveGenerator,
    wave: Wave,
    waves_cleared: u32,
    leaks: u32,
    tick: Tick,
    elapsed: Duration,
    shots: Vec<ShotEvent>,
    events: Vec<TdEvent>,
    /// Raised between ticks, reported with the next tick's events.
    queued_events: Vec<TdEvent>,
    outcome: Option<TerminalOutcome>,
}

impl GameSession {
    pub fn new(
        config: TdConfig,
        players: Vec<Player>,
        map: GameMap,
        generator: WaveGenerator,
        tower_catalog: Vec<TowerSpec>,
    ) -> Result<Self, SessionSetupError> {
        if players.is_empty() {
            return Err(SessionSetupError::NoPlayers);
        }
        let mut seen = HashSet::new();
        for player in &players {
            if !seen.insert(player.id) {
                return Err(SessionSetupError::DuplicatePlayer(player.id));
            }
        }
        if tower_catalog.is_empty() {
            return Err(SessionSetupError::EmptyTowerCatalog);
        }

        let wave = generator.generate_wave(0, map.paths())?;

        Ok(Self {
            config,
            players,
            map,
            tower_catalog,
            towers: SlotMap::with_key(),
            areas: Vec::new(),
            generator,
            wave,
            waves_cleared: 0,
            leaks: 0,
            tick: 0,
            elapsed: Duration::ZERO,
            shots: Vec::new(),
            events: Vec::new(),
            queued_events: vec![TdEvent::WaveStarted { wave: 0 }],
            outcome: None,
        })
    }

    pub fn config(&self) -> &TdConfig {
        &self.config
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn towers(&self) -> &SlotMap<TowerId, Tower> {
        &self.towers
    }

    pub fn tower_catalog(&self) -> &[TowerSpec] {
        &self.tower_catalog
    }

    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    pub fn wave_phase(&self) -> WavePhase {
        self.wave.phase()
    }

    pub fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    pub fn leaks(&self) -> u32 {
        self.leaks
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Simulated time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Shots fired during the last tick.
    pub fn shots(&self) -> &[ShotEvent] {
        &self.shots
    }

    /// Events of the last tick, including those raised since the tick before
    /// it (session creation, tower placement).
    pub fn last_events(&self) -> &[TdEvent] {
        &self.events
    }

    /// Build a tower of catalog kind `kind` for `owner` at `position`.
    pub fn place_tower(
        &mut self,
        owner: PlayerId,
        kind: &str,
        position: Point,
    ) -> Result<TowerId, PlacementError> {
        if self.outcome.is_some() {
            return Err(PlacementError::SessionOver);
        }
        if self.player(owner).is_none() {
            return Err(PlacementError::UnknownPlayer(owner));
        }
        let spec = self
            .tower_catalog
            .iter()
            .find(|spec| spec.kind == kind)
            .ok_or_else(|| PlacementError::UnknownKind(kind.to_string()))?;
        if !self.map.contains(position) {
            return Err(PlacementError::OutOfMap {
                x: position.x,
                y: position.y,
            });
        }
        let min_sq = self.config.min_tower_spacing * self.config.min_tower_spacing;
        if self
            .towers
            .values()
            .any(|t| t.position.distance_sq(position) < min_sq)
        {
            return Err(PlacementError::TooClose);
        }

        let tower = Tower::new(owner, spec, position);
        let range = tower.range;
        let id = self.towers.insert(tower);
        self.areas.push(Area::new(id, position, range));
        self.queued_events.push(TdEvent::TowerPlaced { id, owner });
        Ok(id)
    }

    fn advance(&mut self, delta: Duration) -> Result<(), StepError> {
        if self.outcome.is_some() {
            return Ok(());
        }

        self.events.clear();
        self.events.append(&mut self.queued_events);
        self.tick += 1;
        self.elapsed += delta;
        let offset = self.elapsed.as_millis() as u64;

        // 1. Release the next due monster
        if let Some(id) = self.wave.tick(delta) {
            let path = self
                .wave
                .running()
                .iter()
                .find(|m| m.id == id)
                .map_or(0, |m| m.path);
            self.events.push(TdEvent::MonsterSpawned { id, path });
        }

        // 2. Move monsters along their paths
        let mut escaped = Vec::new();
        for monster in self.wave.running_mut() {
            let Some(path) = self.map.path(monster.path) else {
                continue;
            };
            if monster.advance(path, delta) == MoveResult::ReachedEnd {
                escaped.push(monster.id);
            }
        }
        for id in escaped {
            if self.wave.remove_running(id).is_some() {
                self.leaks += 1;
                self.events.push(TdEvent::MonsterEscaped { id });
            }
        }

        // 3. Collision detection and tower fire
        self.shots = combat::process_tower_shooting(
            self.wave.running(),
            &mut self.areas,
            &mut self.towers,
            offset,
        );

        // 4. Damage, removal, score
        for kill in combat::apply_shots(&self.shots, &self.towers, &mut self.wave) {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == kill.owner) {
                player.add_score(kill.monster.reward);
            }
            self.events.push(TdEvent::MonsterKilled {
                id: kill.monster.id,
                tower: kill.tower,
                owner: kill.owner,
                reward: kill.monster.reward,
            });
        }

        // 5. Reload
        combat::reload_towers(&mut self.towers, delta);

        // 6. Terminal conditions and wave progression
        if self.leaks > self.config.max_leaks {
            self.outcome = Some(TerminalOutcome::Lose);
            return Ok(());
        }

        if self.wave.phase() == WavePhase::Cleared {
            let cleared = self.wave.index();
            self.waves_cleared += 1;
            self.events.push(TdEvent::WaveCleared { wave: cleared });

            if self
                .config
                .waves_total
                .is_some_and(|total| self.waves_cleared >= total)
            {
                self.outcome = Some(TerminalOutcome::Win);
                return Ok(());
            }

            let next = cleared + 1;
            self.wave = self
                .generator
                .generate_wave(next, self.map.paths())
                .map_err(|source| StepError::WaveGeneration { wave: next, source })?;
            self.events.push(TdEvent::WaveStarted { wave: next });
        }

        Ok(())
    }
}

impl Game for GameSession {
    type Snapshot = td_types::SessionSnapshot;
    type Error = StepError;

    fn step(&mut self, delta: Duration) -> Result<(), Self::Error> {
        self.advance(delta)
    }

    fn snapshot(&self) -> Self::Snapshot {
        crate::observe::build_snapshot(self)
    }

    fn players(&self) -> &[Player] {
        &self.players
    }

    fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::MonsterTemplate;
    use crate::pathing::Path;
    use td_core::{PlayerClass, UserProfile};

    const TICK: Duration = Duration::from_millis(100);

    fn config() -> TdConfig {
        TdConfig {
            wave_start_delay_ms: 1_000,
            inter_spawn_delay_ms: 500,
            waves_total: Some(2),
            max_leaks: 0,
            min_tower_spacing: 1.0,
            seed: 11,
        }
    }

    fn session(monster_speed: f32) -> GameSession {
        let catalog = vec![MonsterTemplate {
            kind: "Goblin".to_string(),
            health: 4,
            speed: monster_speed,
            reward: 10,
        }];
        let config = config();
        let generator = WaveGenerator::from_config(catalog, &config, config.seed).unwrap();
        let path = Path::new(vec![Point::new(0.0, 5.0), Point::new(20.0, 5.0)]).unwrap();
        let map = GameMap::new(20.0, 10.0, vec![path]).unwrap();
        let towers = vec![TowerSpec {
            kind: "Arrow".to_string(),
            range: 3.0,
            damage: 4,
            reload_ms: 1_000,
        }];
        let players = vec![
            Player::from_user(&UserProfile::new(1, "alice"), PlayerClass::Engineer),
            Player::from_user(&UserProfile::new(2, "bob"), PlayerClass::Sniper),
        ];
        GameSession::new(config, players, map, generator, towers).unwrap()
    }

    fn run(session: &mut GameSession, ticks: usize) {
        for _ in 0..ticks {
            session.step(TICK).unwrap();
        }
    }

    #[test]
    fn test_rejects_bad_setup() {
        let s = session(1.0);
        let generator = s.generator.clone();
        let err = GameSession::new(
            config(),
            Vec::new(),
            s.map.clone(),
            generator.clone(),
            s.tower_catalog.clone(),
        );
        assert!(matches!(err, Err(SessionSetupError::NoPlayers)));

        let twice = vec![s.players[0].clone(), s.players[0].clone()];
        let err = GameSession::new(config(), twice, s.map.clone(), generator, s.tower_catalog.clone());
        assert!(matches!(err, Err(SessionSetupError::DuplicatePlayer(1))));
    }

    #[test]
    fn test_placement_rules() {
        let mut s = session(1.0);
        assert!(s.place_tower(1, "Arrow", Point::new(5.0, 6.0)).is_ok());
        assert_eq!(
            s.place_tower(1, "Arrow", Point::new(5.5, 6.0)),
            Err(PlacementError::TooClose)
        );
        assert_eq!(
            s.place_tower(9, "Arrow", Point::new(1.0, 1.0)),
            Err(PlacementError::UnknownPlayer(9))
        );
        assert_eq!(
            s.place_tower(1, "Cannon", Point::new(1.0, 1.0)),
            Err(PlacementError::UnknownKind("Cannon".to_string()))
        );
        assert!(matches!(
            s.place_tower(2, "Arrow", Point::new(25.0, 1.0)),
            Err(PlacementError::OutOfMap { .. })
        ));
    }

    #[test]
    fn test_monster_released_after_start_delay() {
        let mut s = session(1.0);
        run(&mut s, 9);
        assert!(s.wave().running().is_empty());
        run(&mut s, 1);
        assert_eq!(s.wave().running().len(), 1);
        assert_eq!(s.wave_phase(), WavePhase::Active);
    }

    #[test]
    fn test_kill_scores_for_tower_owner() {
        let mut s = session(1.0);
        s.place_tower(2, "Arrow", Point::new(1.0, 5.0)).unwrap();
        run(&mut s, 10);

        assert_eq!(s.player(2).unwrap().score, 10);
        assert_eq!(s.player(1).unwrap().score, 0);
        assert_eq!(s.shots().len(), 1);
        assert!(s
            .last_events()
            .iter()
            .any(|e| matches!(e, TdEvent::WaveStarted { wave: 1 })));
        assert_eq!(s.wave().index(), 1);
    }

    #[test]
    fn test_events_between_ticks_reach_the_next_tick() {
        let mut s = session(1.0);
        assert!(s.last_events().is_empty());

        let id = s.place_tower(2, "Arrow", Point::new(1.0, 6.0)).unwrap();
        assert!(s.last_events().is_empty());
        s.step(TICK).unwrap();

        assert_eq!(
            s.last_events(),
            &[
                TdEvent::WaveStarted { wave: 0 },
                TdEvent::TowerPlaced { id, owner: 2 }
            ]
        );

        s.step(TICK).unwrap();
        assert!(s.last_events().is_empty());
    }

    #[test]
    fn test_escape_past_max_leaks_loses() {
        // 20 units at 200 units/s: the monster escapes on its first tick.
        let mut s = session(200.0);
        run(&mut s, 10);
        assert_eq!(s.leaks(), 1);
        assert_eq!(s.is_terminal(), Some(TerminalOutcome::Lose));

        let tick = s.tick();
        s.step(TICK).unwrap();
        assert_eq!(s.tick(), tick);
    }

    #[test]
    fn test_clearing_every_wave_wins() {
        let mut s = session(1.0);
        s.place_tower(1, "Arrow", Point::new(1.0, 5.0)).unwrap();
        // Wave 0: release at 1.0 s. Wave 1: releases at 1.0 s and 1.5 s after it starts.
        run(&mut s, 40);
        assert_eq!(s.waves_cleared(), 2);
        assert_eq!(s.is_terminal(), Some(TerminalOutcome::Win));
        assert_eq!(s.player(1).unwrap().score, 30);
    }
}
