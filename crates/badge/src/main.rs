//! `ledflow`: run the fluid badge on a desktop with a synthetic tilt sensor
//! and an ASCII console display.
//!
//! Usage: `ledflow [config.json]`. Set `RUST_LOG=info` to see progress.

use std::path::Path;

use ledflow_badge::{layout, run_badge, BadgeConfig, ConsoleSink, TiltSource};
use ledflow_sim::{FlipSimulation, Grid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            BadgeConfig::load_json(Path::new(&path))?
        }
        None => BadgeConfig::default(),
    };
    config.validate()?;

    let grid = Grid::from_mask(&layout::badge_mask()?)?;
    let simulation = FlipSimulation::seeded(grid, config.particle_count, config.sim.clone(), config.seed)?;
    let field = layout::attractor_field()?;

    let report = run_badge(
        simulation,
        &field,
        TiltSource::new(config.seed),
        ConsoleSink::stdout(config.console_every),
        &config,
    );

    log::info!(
        "Done: {} sim ticks ({} soft faults, {} late), {} frames pushed ({} sensor errors, {} display errors)",
        report.sim.ticks,
        report.sim.soft_faults,
        report.sim.late_ticks,
        report.io.frames_pushed,
        report.io.sensor_errors,
        report.io.sink_errors
    );
    Ok(())
}
