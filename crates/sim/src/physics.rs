//! Fixed physical constants shared by the simulation stages.
//!
//! Tunable values live in [`SimConfig`](crate::config::SimConfig). The numbers
//! here are geometric tolerances that keep particles strictly inside cells;
//! changing them changes which cell a particle lands in.

/// Gap kept between a clamped coordinate and the far grid edge.
///
/// `set_position` clamps to `[0, dim - POSITION_EPSILON]` so that
/// `floor(coord)` is always a valid cell index.
pub const POSITION_EPSILON: f32 = 0.0001;

/// Distance from the grid edge that an out-of-grid move is clipped to.
///
/// Larger than [`POSITION_EPSILON`] so a clipped particle still sits
/// comfortably inside the last row/column of cells.
pub const BOUNDARY_MARGIN: f32 = 0.001;

/// How far short of a solid cell edge the integrator stops a particle.
pub const SOLID_MARGIN: f32 = 0.005;

/// Coincident particles are separated by moving one of them
/// `diameter / COINCIDENT_NUDGE_DIVISOR` along each axis toward the grid center.
pub const COINCIDENT_NUDGE_DIVISOR: f32 = 1.41;

/// Sentinel time for an axis that imposes no constraint on a solid-clipped move.
pub const NO_CONSTRAINT: f32 = f32::INFINITY;
