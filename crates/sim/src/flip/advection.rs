//! Particle integration with wall clipping.
//!
//! A particle moves along its velocity for one tick. Moves that would leave
//! the grid are shortened to stop just inside it; moves that end in a solid
//! cell are shortened to stop just short of that cell's near edge, repeated
//! until the particle lands in open space or the correction cap is reached.

use glam::Vec2;

use super::FlipSimulation;
use crate::force::ForceField;
use crate::grid::Grid;
use crate::particle::Particle;
use crate::physics::{BOUNDARY_MARGIN, NO_CONSTRAINT, SOLID_MARGIN};

/// Per-move constants, pulled out of the config once per tick.
#[derive(Clone, Copy, Debug)]
struct MoveParams {
    dt: f32,
    bounds: Vec2,
    wall_escape_speed: f32,
    max_solid_corrections: usize,
}

impl FlipSimulation {
    /// Apply `force` and move every particle. Returns the number of moves that
    /// gave up and stayed put.
    pub fn integrate_particles<F: ForceField + ?Sized>(&mut self, force: &F) -> u32 {
        let params = MoveParams {
            dt: self.config.dt,
            bounds: self.grid.bounds(),
            wall_escape_speed: self.config.wall_escape_speed,
            max_solid_corrections: self.config.max_solid_corrections,
        };
        let grid = &self.grid;

        let mut overruns = 0;
        for particle in self.particles.iter_mut() {
            particle.velocity += force.acceleration(particle) * params.dt;
            if !particle.velocity.is_finite() {
                log::debug!("particle {}: non-finite velocity reset", particle.id());
                particle.velocity = Vec2::ZERO;
            }

            if !move_particle(particle, grid, &params) {
                log::debug!(
                    "particle {}: no open cell along its path, left at {:?}",
                    particle.id(),
                    particle.position()
                );
                overruns += 1;
            }
        }
        overruns
    }
}

/// Move one particle. Returns false if the solid correction cap was hit.
fn move_particle(particle: &mut Particle, grid: &Grid, params: &MoveParams) -> bool {
    let start = particle.position();
    let (start_x, start_y) = particle.cell();
    let velocity = particle.velocity;

    // Stop out-of-grid moves just inside the edge
    let tentative = start + velocity * params.dt;
    let t_x = edge_time(start.x, velocity.x, tentative.x, params.bounds.x, params.dt);
    let t_y = edge_time(start.y, velocity.y, tentative.y, params.bounds.y, params.dt);
    let mut next = advance(start, velocity, t_x.min(t_y), params.bounds);
    let tentative_cell = cell_of(next);

    // Walk back out of solids
    let mut settled = true;
    let mut corrections = 0;
    let mut cell = tentative_cell;
    while grid.is_solid(cell.0, cell.1) {
        if corrections == params.max_solid_corrections {
            next = start;
            settled = false;
            break;
        }
        corrections += 1;

        let t = solid_entry_time(start.x, velocity.x, cell.0, start_x)
            .min(solid_entry_time(start.y, velocity.y, cell.1, start_y));
        let t = if t.is_finite() { t } else { 0.0 };
        next = advance(start, velocity, t, params.bounds);
        cell = cell_of(next);
    }

    // Bounce off an adjacent wall in the direction of travel
    if velocity.x > 0.0 && grid.is_solid_offset(start_x, start_y, 1, 0) {
        particle.velocity.x = -params.wall_escape_speed;
    } else if velocity.x < 0.0 && grid.is_solid_offset(start_x, start_y, -1, 0) {
        particle.velocity.x = params.wall_escape_speed;
    }
    if velocity.y > 0.0 && grid.is_solid_offset(start_x, start_y, 0, 1) {
        particle.velocity.y = -params.wall_escape_speed;
    } else if velocity.y < 0.0 && grid.is_solid_offset(start_x, start_y, 0, -1) {
        particle.velocity.y = params.wall_escape_speed;
    }

    particle.set_position(next, params.bounds);

    // Whatever got clipped loses its velocity
    let (final_x, final_y) = particle.cell();
    if final_x != tentative_cell.0 {
        particle.velocity.x = 0.0;
    }
    if final_y != tentative_cell.1 {
        particle.velocity.y = 0.0;
    }

    settled
}

/// Time until one axis reaches its clip line, or `dt` if it stays inside.
#[inline]
fn edge_time(start: f32, velocity: f32, tentative: f32, bound: f32, dt: f32) -> f32 {
    if (0.0..bound).contains(&tentative) || velocity == 0.0 {
        return dt;
    }
    let limit = if velocity > 0.0 {
        bound - BOUNDARY_MARGIN
    } else {
        BOUNDARY_MARGIN
    };
    let t = (limit - start) / velocity;
    if t.is_finite() {
        t.clamp(0.0, dt)
    } else {
        dt
    }
}

/// Time until one axis reaches the near edge of `solid_cell`, less a margin.
///
/// An axis whose cell never changed is not what put the particle in the
/// solid, so it imposes no constraint.
#[inline]
fn solid_entry_time(start: f32, velocity: f32, solid_cell: usize, start_cell: usize) -> f32 {
    if solid_cell == start_cell || velocity == 0.0 {
        return NO_CONSTRAINT;
    }
    let edge = if velocity > 0.0 {
        solid_cell as f32 - SOLID_MARGIN
    } else {
        solid_cell as f32 + 1.0 + SOLID_MARGIN
    };
    let t = (edge - start) / velocity;
    if t.is_nan() {
        NO_CONSTRAINT
    } else {
        t.max(0.0)
    }
}

#[inline]
fn advance(start: Vec2, velocity: Vec2, t: f32, bounds: Vec2) -> Vec2 {
    (start + velocity * t).clamp(
        Vec2::splat(BOUNDARY_MARGIN),
        bounds - Vec2::splat(BOUNDARY_MARGIN),
    )
}

#[inline]
fn cell_of(pos: Vec2) -> (usize, usize) {
    (pos.x as usize, pos.y as usize)
}
