//! Property-based tests for the mode cycle and brightness mapping

use ledflow_badge::render::cell_brightness;
use ledflow_badge::{DisplayMode, ModeCycle, ModeSchedule};
use ledflow_sim::{CellState, Grid};
use proptest::prelude::*;

fn schedule() -> impl Strategy<Value = ModeSchedule> {
    (1u32..50, 1u32..50, 1u32..50).prop_map(|(a, b, c)| ModeSchedule {
        zero_g_at: a,
        attractor_at: a + b,
        cycle_len: a + b + c,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: one full cycle visits each mode once and ends where it started
    #[test]
    fn test_cycle_is_periodic(schedule in schedule(), cycles in 1usize..4) {
        let mut cycle = ModeCycle::new(schedule);
        let mut changes = Vec::new();
        for _ in 0..(schedule.cycle_len as usize * cycles) {
            if let Some(mode) = cycle.advance() {
                changes.push(mode);
            }
        }

        prop_assert_eq!(cycle.mode(), DisplayMode::NormalGravity);
        prop_assert_eq!(cycle.tick(), 0);
        prop_assert_eq!(changes.len(), 3 * cycles);
        for chunk in changes.chunks(3) {
            prop_assert_eq!(
                chunk,
                &[DisplayMode::ZeroGravity, DisplayMode::Attractor, DisplayMode::NormalGravity][..]
            );
        }
    }

    /// Property: brightness never decreases as a water cell fills up
    #[test]
    fn test_brightness_is_monotone(count in 0u32..200) {
        let grid = Grid::bordered(4, 4).unwrap();
        let mut cell = *grid.cell(1, 1);
        cell.state = CellState::Water;

        cell.particle_count = count;
        let a = cell_brightness(&cell);
        cell.particle_count = count + 1;
        let b = cell_brightness(&cell);
        prop_assert!(b >= a);
        prop_assert!(a >= 1);
    }
}
