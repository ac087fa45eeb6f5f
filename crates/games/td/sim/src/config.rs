use serde::Deserialize;
use std::time::Duration;

/// Tunables of one tower-defense session.
///
/// Durations are stored as milliseconds so the config can be loaded from JSON
/// through the resource provider; use the accessor methods to get `Duration`s.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TdConfig {
    /// Delay between wave start and the first monster release.
    pub wave_start_delay_ms: u64,
    /// Delay between two consecutive monster releases.
    pub inter_spawn_delay_ms: u64,
    /// Number of waves to clear for a win. `None` plays until the players lose.
    pub waves_total: Option<u32>,
    /// Escaped monsters tolerated before the session is lost.
    pub max_leaks: u32,
    /// Minimum distance between two towers.
    pub min_tower_spacing: f32,
    /// Base seed for wave generation.
    pub seed: u64,
}

impl TdConfig {
    pub fn wave_start_delay(&self) -> Duration {
        Duration::from_millis(self.wave_start_delay_ms)
    }

    pub fn inter_spawn_delay(&self) -> Duration {
        Duration::from_millis(self.inter_spawn_delay_ms)
    }
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            wave_start_delay_ms: 10_000,
            inter_spawn_delay_ms: 500,
            waves_total: Some(10),
            max_leaks: 10,
            min_tower_spacing: 1.0,
            seed: 0,
        }
    }
}
