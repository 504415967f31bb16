//! Property-based tests for the FLIP simulation using proptest
//!
//! These tests verify the tick invariants hold across random initial conditions:
//! - No NaN values in positions/velocities
//! - Particle count conservation
//! - Particles stay inside the grid and out of solids
//! - Cell counts agree with particle positions

use glam::Vec2;
use ledflow_sim::{FlipSimulation, Grid, SimConfig, SolidMask};
use proptest::prelude::*;

const GRID_WIDTH: usize = 16;
const GRID_HEIGHT: usize = 12;
const SIMULATION_STEPS: usize = 8;

fn test_grid() -> Grid {
    let mut mask = SolidMask::bordered(GRID_WIDTH, GRID_HEIGHT).unwrap();
    // Floating block in the middle
    mask.fill_rect(7, 5, 2, 2);
    Grid::from_mask(&mask).unwrap()
}

/// Positions in the open interior, away from the block
fn valid_position() -> impl Strategy<Value = Vec2> {
    (1.0f32..(GRID_WIDTH as f32 - 1.001), 1.0f32..(GRID_HEIGHT as f32 - 1.001))
        .prop_map(|(x, y)| Vec2::new(x, y))
        .prop_filter("inside the block", |p| !(p.x >= 7.0 && p.x < 9.0 && p.y >= 5.0 && p.y < 7.0))
}

fn valid_velocity() -> impl Strategy<Value = Vec2> {
    (-20.0f32..20.0f32, -20.0f32..20.0f32).prop_map(|(x, y)| Vec2::new(x, y))
}

fn particle_set() -> impl Strategy<Value = Vec<(Vec2, Vec2)>> {
    (1usize..=60).prop_flat_map(|count| prop::collection::vec((valid_position(), valid_velocity()), count..=count))
}

fn force() -> impl Strategy<Value = Vec2> {
    (-60.0f32..60.0f32, -60.0f32..60.0f32).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: every tick leaves particles finite, in bounds, out of solids and counted
    #[test]
    fn test_tick_invariants(seeds in particle_set(), gravity in force()) {
        let count = seeds.len();
        let mut sim = FlipSimulation::from_particles(test_grid(), seeds, SimConfig::default()).unwrap();

        for _ in 0..SIMULATION_STEPS {
            sim.step(&gravity);

            let grid = sim.grid();
            let bounds = grid.bounds();
            prop_assert_eq!(sim.particles().len(), count);

            let mut brute = vec![0u32; grid.len()];
            for p in sim.particles().iter() {
                let pos = p.position();
                prop_assert!(pos.is_finite(), "Position {} contains NaN/Inf: {:?}", p.id(), pos);
                prop_assert!(p.velocity.is_finite(), "Velocity {} contains NaN/Inf: {:?}", p.id(), p.velocity);
                prop_assert!(pos.x >= 0.0 && pos.x < bounds.x && pos.y >= 0.0 && pos.y < bounds.y);

                let (cx, cy) = p.cell();
                prop_assert_eq!((cx, cy), (pos.x as usize, pos.y as usize));
                prop_assert!(!grid.is_solid(cx, cy), "Particle {} in solid ({}, {})", p.id(), cx, cy);
                brute[grid.cell_index(cx, cy)] += 1;
            }

            for (idx, cell) in grid.cells().iter().enumerate() {
                prop_assert_eq!(cell.particle_count, brute[idx]);
            }
        }
    }

    /// Property: bucket offsets are monotone and partition all particles
    #[test]
    fn test_index_partitions_particles(seeds in particle_set()) {
        let count = seeds.len();
        let mut sim = FlipSimulation::from_particles(test_grid(), seeds, SimConfig::default()).unwrap();
        sim.step(&Vec2::ZERO);

        let offsets = sim.index().cell_offsets();
        prop_assert_eq!(offsets[0], 0);
        prop_assert_eq!(offsets[offsets.len() - 1], count);
        prop_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));

        let mut seen = sim.index().particle_ids().to_vec();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..count as u32).collect::<Vec<_>>());
    }
}
