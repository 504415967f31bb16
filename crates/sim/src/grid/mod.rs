//! MAC (Marker-and-Cell) grid matching the LED matrix, one cell per LED.
//!
//! Uses staggered grid layout (y grows downward):
//! - u (horizontal flow) stored on the left face of each cell, at (x, y + 0.5)
//! - v (vertical flow) stored on the top face of each cell, at (x + 0.5, y)
//! - particle counts and occupancy at cell centers
//!
//! Cells are stored row-major, `index = y * width + x`. Neighbor lookups past
//! the edge clamp to the cell itself; the edge is always solid so nothing
//! ever flows through it.

mod interp;
mod mask;
mod pressure;

pub use interp::{Axis, Stencil};
pub use mask::SolidMask;
pub use pressure::SolverParams;

use glam::Vec2;

use crate::error::SimError;

/// Occupancy of a cell. Solid is fixed at construction; Air/Water is
/// recomputed every tick from the particles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    Solid,
    #[default]
    Air,
    Water,
}

/// One grid cell.
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub state: CellState,
    /// Horizontal flow on the left face.
    pub u_flow: f32,
    /// Vertical flow on the top face.
    pub v_flow: f32,
    /// Accumulated transfer weight for `u_flow`.
    pub u_weight: f32,
    /// Accumulated transfer weight for `v_flow`.
    pub v_weight: f32,
    /// `u_flow` as it was before the incompressibility solve.
    pub prev_u_flow: f32,
    /// `v_flow` as it was before the incompressibility solve.
    pub prev_v_flow: f32,
    /// 0.0 for solid cells, 1.0 otherwise.
    pub flow_allowed: f32,
    /// Particles whose position lies in this cell, as of the last index rebuild.
    pub particle_count: u32,
    x: usize,
    y: usize,
}

impl Cell {
    fn new(x: usize, y: usize, solid: bool) -> Self {
        Self {
            state: if solid { CellState::Solid } else { CellState::Air },
            u_flow: 0.0,
            v_flow: 0.0,
            u_weight: 0.0,
            v_weight: 0.0,
            prev_u_flow: 0.0,
            prev_v_flow: 0.0,
            flow_allowed: if solid { 0.0 } else { 1.0 },
            particle_count: 0,
            x,
            y,
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.state == CellState::Solid
    }

    #[inline]
    pub fn is_water(&self) -> bool {
        self.state == CellState::Water
    }

    /// Current flow on the face sampled by `axis`.
    #[inline]
    pub fn flow(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.u_flow,
            Axis::Vertical => self.v_flow,
        }
    }

    /// Pre-solve flow on the face sampled by `axis`.
    #[inline]
    pub fn prev_flow(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.prev_u_flow,
            Axis::Vertical => self.prev_v_flow,
        }
    }
}

/// MAC grid for the simulation
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid whose solid cells follow `mask`.
    pub fn from_mask(mask: &SolidMask) -> Result<Self, SimError> {
        if mask.open_count() == 0 {
            return Err(SimError::NoOpenCells);
        }

        let (width, height) = (mask.width(), mask.height());
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y, mask.is_solid(x, y)));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Open rectangle with a one-cell solid border.
    pub fn bordered(width: usize, height: usize) -> Result<Self, SimError> {
        Self::from_mask(&SolidMask::bordered(width, height)?)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid extent in cell units.
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell index from coordinates
    #[inline]
    pub fn cell_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.cell_index(x, y)]
    }

    /// Mutable access for seeding flow fields in tests and tools.
    ///
    /// Changing `state` to or from `Solid` here breaks the fixed-obstacle
    /// invariant; only the flow and weight fields are meant to be touched.
    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let idx = self.cell_index(x, y);
        &mut self.cells[idx]
    }

    #[inline]
    pub fn at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    // ========================================================================
    // Neighbors (clamped to self at the edge)
    // ========================================================================

    #[inline]
    pub fn left(&self, idx: usize) -> usize {
        if idx % self.width == 0 {
            idx
        } else {
            idx - 1
        }
    }

    #[inline]
    pub fn right(&self, idx: usize) -> usize {
        if idx % self.width == self.width - 1 {
            idx
        } else {
            idx + 1
        }
    }

    #[inline]
    pub fn up(&self, idx: usize) -> usize {
        if idx < self.width {
            idx
        } else {
            idx - self.width
        }
    }

    #[inline]
    pub fn down(&self, idx: usize) -> usize {
        if idx + self.width >= self.cells.len() {
            idx
        } else {
            idx + self.width
        }
    }

    /// Check if cell is solid (out of bounds counts as solid)
    #[inline]
    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.cells[self.cell_index(x, y)].is_solid()
    }

    /// Solid check for the cell `(x + dx, y + dy)`; negative coordinates are solid.
    #[inline]
    pub fn is_solid_offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> bool {
        match (x.checked_add_signed(dx), y.checked_add_signed(dy)) {
            (Some(nx), Some(ny)) => self.is_solid(nx, ny),
            _ => true,
        }
    }

    /// Solid check for the cell containing a continuous position.
    #[inline]
    pub fn is_solid_at(&self, pos: Vec2) -> bool {
        if !(pos.x >= 0.0 && pos.y >= 0.0) || !pos.is_finite() {
            return true;
        }
        self.is_solid(pos.x as usize, pos.y as usize)
    }

    /// Cells that are not solid.
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_solid()).count()
    }

    /// Area of the interior inside the outer border, used as the
    /// denominator of the rest density.
    pub fn interior_area(&self) -> f32 {
        ((self.width - 2) * (self.height - 2)) as f32
    }

    // ========================================================================
    // Divergence
    // ========================================================================

    /// Net outflow of a cell. Faces shared with a solid neighbor contribute nothing.
    pub fn divergence(&self, idx: usize) -> f32 {
        let cell = &self.cells[idx];
        let left = &self.cells[self.left(idx)];
        let right = &self.cells[self.right(idx)];
        let up = &self.cells[self.up(idx)];
        let down = &self.cells[self.down(idx)];

        -cell.u_flow * left.flow_allowed + right.u_flow * right.flow_allowed
            - cell.v_flow * up.flow_allowed
            + down.v_flow * down.flow_allowed
    }

    /// Sum of |divergence| over water cells.
    pub fn total_divergence(&self) -> f32 {
        (0..self.cells.len())
            .filter(|&idx| self.cells[idx].is_water())
            .map(|idx| self.divergence(idx).abs())
            .sum()
    }

    /// Zero every face that touches a solid cell.
    pub(crate) fn zero_solid_faces(&mut self) {
        for idx in 0..self.cells.len() {
            if !self.cells[idx].is_solid() {
                continue;
            }
            let right = self.right(idx);
            let down = self.down(idx);
            self.cells[idx].u_flow = 0.0;
            self.cells[idx].v_flow = 0.0;
            self.cells[right].u_flow = 0.0;
            self.cells[down].v_flow = 0.0;
        }
    }
}
