//! Simulation tuning.
//!
//! Every field has a default matching the badge firmware, so a partial JSON
//! file only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::grid::SolverParams;

/// Tunable parameters for [`FlipSimulation`](crate::FlipSimulation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds per tick.
    pub dt: f32,
    /// Collision relaxation passes per tick.
    pub collision_passes: usize,
    /// Incompressibility sweeps per tick.
    pub pressure_iterations: usize,
    /// 0 = pure PIC, 1 = pure FLIP.
    pub flip_ratio: f32,
    /// SOR factor applied to measured divergence. Must stay below 2.
    pub overrelaxation: f32,
    /// Strength of the overcrowding penalty in the solver.
    pub compression_weight: f32,
    /// Particle diameter in cell units.
    pub particle_diameter: f32,
    /// Velocity multiplier applied to both particles of a contact.
    pub collision_damping: f32,
    /// Speed a particle is bounced back with when it runs into a wall.
    pub wall_escape_speed: f32,
    /// Cap on solid-clipping corrections for a single move.
    pub max_solid_corrections: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            collision_passes: 5,
            pressure_iterations: 40,
            flip_ratio: 0.9,
            overrelaxation: 1.9,
            compression_weight: 1.5,
            particle_diameter: 1.0,
            collision_damping: 0.999,
            wall_escape_speed: 0.01,
            max_solid_corrections: 8,
        }
    }
}

impl SimConfig {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), SimError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SimError> {
            Err(SimError::InvalidConfig { field, reason })
        }

        if !(self.dt.is_finite() && self.dt > 0.0) {
            return invalid("dt", "must be positive and finite");
        }
        if !(0.0..=1.0).contains(&self.flip_ratio) {
            return invalid("flip_ratio", "must be within [0, 1]");
        }
        if !(self.overrelaxation > 0.0 && self.overrelaxation < 2.0) {
            return invalid("overrelaxation", "must be within (0, 2)");
        }
        if !(self.compression_weight.is_finite() && self.compression_weight >= 0.0) {
            return invalid("compression_weight", "must be non-negative");
        }
        if !(self.particle_diameter.is_finite() && self.particle_diameter > 0.0) {
            return invalid("particle_diameter", "must be positive");
        }
        if !(self.collision_damping > 0.0 && self.collision_damping <= 1.0) {
            return invalid("collision_damping", "must be within (0, 1]");
        }
        if !(self.wall_escape_speed.is_finite() && self.wall_escape_speed >= 0.0) {
            return invalid("wall_escape_speed", "must be non-negative");
        }
        if self.max_solid_corrections == 0 {
            return invalid("max_solid_corrections", "must be at least 1");
        }
        Ok(())
    }

    /// Solver parameters for a grid whose fluid would sit at `target_density`
    /// particles per cell if spread evenly.
    pub fn solver_params(&self, target_density: f32) -> SolverParams {
        SolverParams {
            iterations: self.pressure_iterations,
            overrelaxation: self.overrelaxation,
            compression_weight: self.compression_weight,
            target_density,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases: Vec<(SimConfig, &str)> = vec![
            (SimConfig { dt: 0.0, ..Default::default() }, "dt"),
            (SimConfig { flip_ratio: 1.5, ..Default::default() }, "flip_ratio"),
            (SimConfig { overrelaxation: 2.0, ..Default::default() }, "overrelaxation"),
            (SimConfig { particle_diameter: -1.0, ..Default::default() }, "particle_diameter"),
            (SimConfig { collision_damping: 0.0, ..Default::default() }, "collision_damping"),
            (SimConfig { max_solid_corrections: 0, ..Default::default() }, "max_solid_corrections"),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(SimError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {} to be rejected, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "flip_ratio": 0.5 }"#).unwrap();
        assert_eq!(config.flip_ratio, 0.5);
        assert_eq!(config.pressure_iterations, 40);
        assert_eq!(config.collision_passes, 5);
    }

    #[test]
    fn json_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("ledflow_sim_config_{}.json", std::process::id()));
        let config = SimConfig {
            pressure_iterations: 12,
            ..Default::default()
        };
        config.save_json(&path).unwrap();
        let loaded = SimConfig::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
