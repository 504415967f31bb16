//! Badge runtime configuration, loaded from JSON.

use serde::{Deserialize, Serialize};

use ledflow_sim::{SimConfig, SimError};

/// Slowest accepted tick rate.
pub const MIN_TICK_HZ: f32 = 0.1;
/// Fastest accepted tick rate.
pub const MAX_TICK_HZ: f32 = 10_000.0;
/// Longest bounded run, one year.
pub const MAX_RUN_SECONDS: f32 = 31_536_000.0;

/// Ticks at which the display mode changes within one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSchedule {
    /// Switch from tilt gravity to weightlessness.
    pub zero_g_at: u32,
    /// Switch to the attractor image.
    pub attractor_at: u32,
    /// Back to tilt gravity and restart the cycle.
    pub cycle_len: u32,
}

impl Default for ModeSchedule {
    fn default() -> Self {
        Self {
            zero_g_at: 1200,
            attractor_at: 1600,
            cycle_len: 2400,
        }
    }
}

/// Everything the `ledflow` binary needs besides the badge layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    pub sim: SimConfig,
    pub particle_count: usize,
    /// Seed for particle placement and the synthetic tilt source.
    pub seed: u64,
    /// Rate of both periodic contexts.
    pub tick_hz: f32,
    /// Raw accelerometer counts to cells per second squared.
    pub accel_scale: f32,
    pub modes: ModeSchedule,
    /// Stop after this many seconds; run forever when absent.
    pub run_seconds: Option<f32>,
    /// Print every n-th frame to the console sink.
    pub console_every: u32,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            particle_count: 350,
            seed: 0x1ED5,
            tick_hz: 60.0,
            accel_scale: 0.0039 * 20.0,
            modes: ModeSchedule::default(),
            run_seconds: None,
            console_every: 30,
        }
    }
}

impl BadgeConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SimError> {
            Err(SimError::InvalidConfig { field, reason })
        }

        self.sim.validate()?;
        if !(MIN_TICK_HZ..=MAX_TICK_HZ).contains(&self.tick_hz) {
            return invalid("tick_hz", "must be between 0.1 and 10000");
        }
        if !self.accel_scale.is_finite() {
            return invalid("accel_scale", "must be finite");
        }
        let m = &self.modes;
        if !(0 < m.zero_g_at && m.zero_g_at < m.attractor_at && m.attractor_at < m.cycle_len) {
            return invalid("modes", "need 0 < zero_g_at < attractor_at < cycle_len");
        }
        if let Some(secs) = self.run_seconds {
            if !(0.0..=MAX_RUN_SECONDS).contains(&secs) {
                return invalid("run_seconds", "must be between 0 and one year");
            }
        }
        if self.console_every == 0 {
            return invalid("console_every", "must be at least 1");
        }
        Ok(())
    }

    /// Save config to JSON file
    pub fn save_json(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load config from JSON file
    pub fn load_json(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
