use crate::config::TdConfig;
use crate::monster::{Monster, MonsterId, MonsterTemplate};
use crate::pathing::Path;
use crate::resources::{ResourceError, ResourceProvider};
use crate::wave::{SpawnEntry, Wave};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use thiserror::Error;

pub const MONSTER_CATALOG_PATH: &str = "monsters/MonstersList.json";

#[derive(Debug, Error)]
pub enum WaveGeneratorError {
    #[error("monster catalog is empty")]
    EmptyCatalog,
    #[error("cannot generate a wave without paths")]
    NoPaths,
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Builds the spawn schedule of a wave from the preloaded monster catalog.
///
/// Generation is a pure function of `(seed, wave index, paths)`: the catalog is
/// never mutated and every wave gets its own RNG stream.
#[derive(Clone, Debug)]
pub struct WaveGenerator {
    catalog: Vec<MonsterTemplate>,
    seed: u64,
    wave_start_delay: Duration,
    inter_spawn_delay: Duration,
}

impl WaveGenerator {
    pub fn new(
        catalog: Vec<MonsterTemplate>,
        seed: u64,
        wave_start_delay: Duration,
        inter_spawn_delay: Duration,
    ) -> Result<Self, WaveGeneratorError> {
        if catalog.is_empty() {
            return Err(WaveGeneratorError::EmptyCatalog);
        }
        Ok(Self {
            catalog,
            seed,
            wave_start_delay,
            inter_spawn_delay,
        })
    }

    pub fn from_config(
        catalog: Vec<MonsterTemplate>,
        config: &TdConfig,
        seed: u64,
    ) -> Result<Self, WaveGeneratorError> {
        Self::new(
            catalog,
            seed,
            config.wave_start_delay(),
            config.inter_spawn_delay(),
        )
    }

    /// Load the catalog from [`MONSTER_CATALOG_PATH`].
    pub fn load(
        resources: &impl ResourceProvider,
        config: &TdConfig,
        seed: u64,
    ) -> Result<Self, WaveGeneratorError> {
        let catalog = resources.load_resource_list(MONSTER_CATALOG_PATH)?;
        Self::from_config(catalog, config, seed)
    }

    pub fn catalog(&self) -> &[MonsterTemplate] {
        &self.catalog
    }

    /// Release time of the `k`-th monster of a wave, measured from wave start.
    pub fn spawn_offset(&self, k: u32) -> Duration {
        self.wave_start_delay + self.inter_spawn_delay * k
    }

    /// Generate wave `wave_index`: `wave_index + 1` monsters, each with a random
    /// template and a random path from `paths`.
    pub fn generate_wave(&self, wave_index: u32, paths: &[Path]) -> Result<Wave, WaveGeneratorError> {
        if paths.is_empty() {
            return Err(WaveGeneratorError::NoPaths);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(wave_seed(self.seed, wave_index));
        let schedule = (0..=wave_index)
            .map(|k| {
                let template = &self.catalog[rng.gen_range(0..self.catalog.len())];
                let path_index = rng.gen_range(0..paths.len());
                SpawnEntry {
                    monster: Monster::spawn(
                        MonsterId::new(wave_index, k),
                        template,
                        path_index,
                        &paths[path_index],
                    ),
                    offset: self.spawn_offset(k),
                }
            })
            .collect();

        tracing::debug!(wave = wave_index, seed = self.seed, "generated wave");
        Ok(Wave::new(wave_index, schedule))
    }
}

fn wave_seed(seed: u64, wave_index: u32) -> u64 {
    seed ^ (wave_index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
