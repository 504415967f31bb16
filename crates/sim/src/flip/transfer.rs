//! Particle <-> grid velocity transfer.
//!
//! P2G splats each particle's velocity onto the four nearest u faces and the
//! four nearest v faces with bilinear weights, then normalizes by the
//! accumulated weight. G2P samples the same stencils, skipping solid nodes,
//! and blends the PIC sample with the FLIP delta.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::FlipSimulation;
use crate::grid::{Axis, CellState, Grid};
use crate::particle::Particle;

impl FlipSimulation {
    /// P2G: rebuild water/air flags and face flows from the particles.
    pub fn particles_to_grid(&mut self) {
        let grid = &mut self.grid;

        for cell in grid.cells_mut() {
            if cell.state == CellState::Water {
                cell.state = CellState::Air;
            }
            cell.u_flow = 0.0;
            cell.v_flow = 0.0;
            cell.u_weight = 0.0;
            cell.v_weight = 0.0;
        }

        for particle in self.particles.iter() {
            let pos = particle.position();

            let (x, y) = particle.cell();
            let own = grid.cell_index(x, y);
            if grid.at(own).state == CellState::Air {
                grid.cells_mut()[own].state = CellState::Water;
            }

            let u = grid.stencil(pos, Axis::Horizontal);
            let v = grid.stencil(pos, Axis::Vertical);
            let cells = grid.cells_mut();
            for (node, weight) in u.iter() {
                cells[node].u_flow += weight * particle.velocity.x;
                cells[node].u_weight += weight;
            }
            for (node, weight) in v.iter() {
                cells[node].v_flow += weight * particle.velocity.y;
                cells[node].v_weight += weight;
            }
        }

        for cell in grid.cells_mut() {
            if cell.u_weight > 0.0 {
                cell.u_flow /= cell.u_weight;
            }
            if cell.v_weight > 0.0 {
                cell.v_flow /= cell.v_weight;
            }
        }

        grid.zero_solid_faces();

        for cell in grid.cells_mut() {
            cell.prev_u_flow = cell.u_flow;
            cell.prev_v_flow = cell.v_flow;
        }
    }

    /// G2P: blend the solved grid flow back into particle velocities.
    pub fn grid_to_particles(&mut self) {
        let ratio = self.config.flip_ratio;
        let grid = &self.grid;

        #[cfg(feature = "parallel")]
        self.particles
            .as_mut_slice()
            .par_iter_mut()
            .for_each(|p| blend_particle(p, grid, ratio));

        #[cfg(not(feature = "parallel"))]
        for p in self.particles.as_mut_slice() {
            blend_particle(p, grid, ratio);
        }
    }
}

fn blend_particle(particle: &mut Particle, grid: &Grid, flip_ratio: f32) {
    if let Some(vx) = blend_component(grid, particle, Axis::Horizontal, flip_ratio) {
        particle.velocity.x = vx;
    }
    if let Some(vy) = blend_component(grid, particle, Axis::Vertical, flip_ratio) {
        particle.velocity.y = vy;
    }
}

/// Blended velocity for one axis, or `None` if every stencil node is solid.
fn blend_component(grid: &Grid, particle: &Particle, axis: Axis, flip_ratio: f32) -> Option<f32> {
    let stencil = grid.stencil(particle.position(), axis);

    let mut valid_weight = 0.0;
    let mut pic = 0.0;
    let mut delta = 0.0;
    for (node, weight) in stencil.iter() {
        let cell = grid.at(node);
        if cell.is_solid() {
            continue;
        }
        valid_weight += weight;
        pic += weight * cell.flow(axis);
        delta += weight * (cell.flow(axis) - cell.prev_flow(axis));
    }

    if valid_weight <= 0.0 {
        return None;
    }

    let current = match axis {
        Axis::Horizontal => particle.velocity.x,
        Axis::Vertical => particle.velocity.y,
    };
    let pic = pic / valid_weight;
    let flip = current + delta / valid_weight;
    Some(flip_ratio * flip + (1.0 - flip_ratio) * pic)
}
