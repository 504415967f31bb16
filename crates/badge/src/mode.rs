//! Display mode cycle: tilt gravity, then weightless, then the attractor image.

use serde::{Deserialize, Serialize};

use crate::config::ModeSchedule;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Gravity follows the accelerometer.
    NormalGravity,
    /// No external force; the fluid drifts on its own momentum.
    ZeroGravity,
    /// Fluid is pulled into the attractor image.
    Attractor,
}

/// Tick counter that walks through the modes on a fixed schedule.
#[derive(Clone, Debug)]
pub struct ModeCycle {
    schedule: ModeSchedule,
    tick: u32,
    mode: DisplayMode,
}

impl ModeCycle {
    pub fn new(schedule: ModeSchedule) -> Self {
        Self {
            schedule,
            tick: 0,
            mode: DisplayMode::NormalGravity,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Ticks into the current cycle.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Count one tick. Returns the new mode if it changed.
    pub fn advance(&mut self) -> Option<DisplayMode> {
        self.tick += 1;
        let next = if self.tick >= self.schedule.cycle_len {
            self.tick = 0;
            DisplayMode::NormalGravity
        } else if self.tick == self.schedule.attractor_at {
            DisplayMode::Attractor
        } else if self.tick == self.schedule.zero_g_at {
            DisplayMode::ZeroGravity
        } else {
            return None;
        };

        if next == self.mode {
            return None;
        }
        log::info!("Display mode {:?} -> {:?}", self.mode, next);
        self.mode = next;
        Some(next)
    }
}
