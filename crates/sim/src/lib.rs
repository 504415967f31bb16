//! LED Fluid Badge - Simulation Library
//!
//! FLIP/PIC fluid simulation sized for an LED matrix:
//! - One grid cell per LED, fixed solid outline
//! - A few hundred particles, fixed at construction
//! - Counting-sort cell index for neighbor queries
//! - Gauss-Seidel incompressibility with an overcrowding penalty
//!
//! No allocation happens after construction. This crate is hardware-agnostic;
//! the `ledflow_badge` crate wires it to a sensor, a display and two threads.

pub mod config;
pub mod error;
pub mod flip;
pub mod force;
pub mod grid;
pub mod particle;
pub mod physics;
pub mod spatial;

pub use config::SimConfig;
pub use error::SimError;
pub use flip::{CollisionStats, FlipSimulation, StepStats};
pub use force::{FnField, ForceField};
pub use grid::{Axis, Cell, CellState, Grid, SolidMask, SolverParams, Stencil};
pub use particle::{Particle, Particles};
pub use spatial::SpatialIndex;
