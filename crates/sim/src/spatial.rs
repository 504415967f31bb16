//! Cell-bucketed particle index.
//!
//! A counting sort over cell indices: `cell_offsets[c]..cell_offsets[c + 1]`
//! is the slice of `particle_ids` holding the particles in cell `c`, in
//! ascending id order. Both arrays are allocated once and reused.

use std::ops::Range;

use crate::grid::Grid;
use crate::particle::Particles;

pub struct SpatialIndex {
    /// Particle ids grouped by cell.
    particle_ids: Vec<u32>,
    /// One entry per cell plus a trailing total.
    cell_offsets: Vec<usize>,
}

impl SpatialIndex {
    pub fn new(cell_count: usize, particle_count: usize) -> Self {
        Self {
            particle_ids: vec![0; particle_count],
            cell_offsets: vec![0; cell_count + 1],
        }
    }

    /// Re-bucket every particle and write per-cell counts into the grid.
    pub fn rebuild(&mut self, particles: &Particles, grid: &mut Grid) {
        debug_assert_eq!(self.cell_offsets.len(), grid.len() + 1);
        debug_assert_eq!(self.particle_ids.len(), particles.len());

        // 1. Count particles per cell
        self.cell_offsets.fill(0);
        for p in particles.iter() {
            let (x, y) = p.cell();
            self.cell_offsets[grid.cell_index(x, y)] += 1;
        }

        // 2. Inclusive prefix sum: each slot now holds the end of its bucket
        let mut running = 0;
        for slot in self.cell_offsets.iter_mut() {
            running += *slot;
            *slot = running;
        }

        // 3. Fill buckets back to front so each slot ends at the bucket start
        for p in particles.as_slice().iter().rev() {
            let (x, y) = p.cell();
            let cell = grid.cell_index(x, y);
            self.cell_offsets[cell] -= 1;
            self.particle_ids[self.cell_offsets[cell]] = p.id();
        }

        for (idx, cell) in grid.cells_mut().iter_mut().enumerate() {
            cell.particle_count = (self.cell_offsets[idx + 1] - self.cell_offsets[idx]) as u32;
        }
    }

    /// Slots of `particle_ids` belonging to `cell`.
    #[inline]
    pub fn cell_range(&self, cell: usize) -> Range<usize> {
        self.cell_offsets[cell]..self.cell_offsets[cell + 1]
    }

    /// Ids of the particles in `cell`.
    #[inline]
    pub fn particles_in(&self, cell: usize) -> &[u32] {
        &self.particle_ids[self.cell_range(cell)]
    }

    #[inline]
    pub fn particle_ids(&self) -> &[u32] {
        &self.particle_ids
    }

    #[inline]
    pub fn cell_offsets(&self) -> &[usize] {
        &self.cell_offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn scatter(grid: &Grid, positions: &[(f32, f32)]) -> Particles {
        let mut particles = Particles::with_capacity(positions.len(), grid.bounds());
        for &(x, y) in positions {
            particles.push(Vec2::new(x, y), Vec2::ZERO, 1.0);
        }
        particles
    }

    #[test]
    fn buckets_match_brute_force_counts() {
        let mut grid = Grid::bordered(6, 5).unwrap();
        let particles = scatter(
            &grid,
            &[(1.5, 1.5), (2.2, 3.9), (1.1, 1.9), (4.9, 1.0), (2.5, 3.5), (1.0, 1.0)],
        );
        let mut index = SpatialIndex::new(grid.len(), particles.len());
        index.rebuild(&particles, &mut grid);

        for cell in 0..grid.len() {
            let brute: Vec<u32> = particles
                .iter()
                .filter(|p| grid.cell_index(p.cell().0, p.cell().1) == cell)
                .map(|p| p.id())
                .collect();
            assert_eq!(index.particles_in(cell), brute.as_slice(), "cell {}", cell);
            assert_eq!(grid.at(cell).particle_count as usize, brute.len());
        }
        assert_eq!(*index.cell_offsets().last().unwrap(), particles.len());
    }

    #[test]
    fn offsets_are_monotonic() {
        let mut grid = Grid::bordered(5, 5).unwrap();
        let particles = scatter(&grid, &[(3.5, 3.5), (1.5, 1.5), (3.2, 3.1)]);
        let mut index = SpatialIndex::new(grid.len(), particles.len());
        index.rebuild(&particles, &mut grid);

        assert_eq!(index.cell_offsets()[0], 0);
        assert!(index.cell_offsets().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rebuild_clears_previous_counts() {
        let mut grid = Grid::bordered(5, 5).unwrap();
        let particles = scatter(&grid, &[(2.5, 2.5), (2.5, 2.5)]);
        let mut index = SpatialIndex::new(grid.len(), particles.len());
        index.rebuild(&particles, &mut grid);
        index.rebuild(&particles, &mut grid);

        assert_eq!(grid.cell(2, 2).particle_count, 2);
        assert_eq!(index.particles_in(grid.cell_index(2, 2)), &[0, 1]);
    }
}
