//! Incompressibility solve.
//!
//! In-place Gauss-Seidel with over-relaxation directly on the face flows,
//! plus a penalty that pushes fluid out of cells holding more particles than
//! the rest density. Cells are swept in storage order and each update sees
//! the flows already written this sweep.

use super::Grid;

/// Parameters for [`Grid::solve_incompressibility`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverParams {
    pub iterations: usize,
    /// Multiplier on the measured divergence, in (0, 2).
    pub overrelaxation: f32,
    /// Weight of the overcrowding penalty.
    pub compression_weight: f32,
    /// Particles per open cell at rest.
    pub target_density: f32,
}

impl Grid {
    /// Run `params.iterations` sweeps.
    pub fn solve_incompressibility(&mut self, params: &SolverParams) {
        for _ in 0..params.iterations {
            self.relax_once(params);
        }
    }

    /// One sweep over every water cell.
    pub fn relax_once(&mut self, params: &SolverParams) {
        for idx in 0..self.len() {
            if !self.at(idx).is_water() {
                continue;
            }

            let left = self.left(idx);
            let right = self.right(idx);
            let up = self.up(idx);
            let down = self.down(idx);

            let open_left = self.at(left).flow_allowed;
            let open_right = self.at(right).flow_allowed;
            let open_up = self.at(up).flow_allowed;
            let open_down = self.at(down).flow_allowed;

            let open_faces = open_left + open_right + open_up + open_down;
            if open_faces == 0.0 {
                continue;
            }

            let overcrowding =
                (self.at(idx).particle_count as f32 - params.target_density).max(0.0);
            let correction = (self.divergence(idx) * params.overrelaxation
                - params.compression_weight * overcrowding)
                / open_faces;

            let cells = self.cells_mut();
            cells[idx].u_flow += correction * open_left;
            cells[right].u_flow -= correction * open_right;
            cells[idx].v_flow += correction * open_up;
            cells[down].v_flow -= correction * open_down;
        }
    }
}
