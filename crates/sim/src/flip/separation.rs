//! Pairwise particle separation.
//!
//! Each pass visits every particle and checks it against all particles
//! bucketed in the 3x3 block of cells around it. Overlapping pairs are pushed
//! apart along the line between their centers, half the overlap each. A
//! push never moves a particle into a solid cell.

use glam::Vec2;

use super::{CollisionStats, FlipSimulation};
use crate::grid::Grid;
use crate::particle::Particles;
use crate::physics::COINCIDENT_NUDGE_DIVISOR;

/// Result of checking a single pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Contact {
    Apart,
    Resolved,
    Blocked,
    Degenerate,
}

impl FlipSimulation {
    /// Run all configured separation passes against the current index.
    pub fn resolve_collisions(&mut self) -> CollisionStats {
        let mut stats = CollisionStats::default();
        for _ in 0..self.config.collision_passes {
            stats += self.resolve_collisions_pass();
        }
        stats
    }

    /// One separation pass.
    ///
    /// The index is not rebuilt between passes, so a particle pushed across a
    /// cell boundary is still found in its old bucket until the next rebuild.
    pub fn resolve_collisions_pass(&mut self) -> CollisionStats {
        let Self {
            grid,
            particles,
            index,
            config,
            ..
        } = self;
        let damping = config.collision_damping;
        let (width, height) = (grid.width(), grid.height());

        let mut stats = CollisionStats::default();
        for i in 0..particles.len() {
            let (cx, cy) = particles.as_slice()[i].cell();
            for y in cy.saturating_sub(1)..=(cy + 1).min(height - 1) {
                for x in cx.saturating_sub(1)..=(cx + 1).min(width - 1) {
                    for &j in index.particles_in(grid.cell_index(x, y)) {
                        let j = j as usize;
                        if j == i {
                            continue;
                        }
                        match separate_pair(particles, grid, i, j, damping) {
                            Contact::Apart => {}
                            Contact::Resolved => stats.contacts += 1,
                            Contact::Blocked => {
                                log::trace!("particles {} and {}: push blocked by solid", i, j);
                                stats.blocked += 1;
                            }
                            Contact::Degenerate => {
                                log::debug!("particles {} and {}: coincident, nudge blocked", i, j);
                                stats.degenerate += 1;
                            }
                        }
                    }
                }
            }
        }
        stats
    }
}

fn separate_pair(particles: &mut Particles, grid: &Grid, i: usize, j: usize, damping: f32) -> Contact {
    let bounds = particles.bounds();
    let (a, b) = particles.pair_mut(i, j);

    let min_dist = 0.5 * (a.diameter() + b.diameter());
    let min_dist_sq = min_dist * min_dist;

    let mut delta = a.position() - b.position();
    let mut dist_sq = delta.length_squared();
    if dist_sq >= min_dist_sq {
        return Contact::Apart;
    }

    a.velocity *= damping;
    b.velocity *= damping;

    // Coincident: no direction to push along, so move `a` toward the center first
    if dist_sq == 0.0 {
        let nudged = nudge_toward_center(a.position(), a.diameter(), bounds);
        if grid.is_solid_at(nudged) {
            return Contact::Degenerate;
        }
        a.set_position(nudged, bounds);
        delta = a.position() - b.position();
        dist_sq = delta.length_squared();
        if dist_sq == 0.0 {
            return Contact::Degenerate;
        }
        if dist_sq >= min_dist_sq {
            return Contact::Resolved;
        }
    }

    let dist = dist_sq.sqrt();
    let push = delta * (0.5 * (min_dist - dist) / dist);

    let a_target = a.position() + push;
    let b_target = b.position() - push;
    match (grid.is_solid_at(a_target), grid.is_solid_at(b_target)) {
        (false, false) => {
            a.set_position(a_target, bounds);
            b.set_position(b_target, bounds);
            Contact::Resolved
        }
        // One side is against a wall: the other takes the whole push
        (true, false) => {
            let b_full = b.position() - push * 2.0;
            if grid.is_solid_at(b_full) {
                return Contact::Blocked;
            }
            b.set_position(b_full, bounds);
            Contact::Resolved
        }
        (false, true) => {
            let a_full = a.position() + push * 2.0;
            if grid.is_solid_at(a_full) {
                return Contact::Blocked;
            }
            a.set_position(a_full, bounds);
            Contact::Resolved
        }
        (true, true) => Contact::Blocked,
    }
}

fn nudge_toward_center(pos: Vec2, diameter: f32, bounds: Vec2) -> Vec2 {
    let offset = diameter / COINCIDENT_NUDGE_DIVISOR;
    let center = bounds * 0.5;
    Vec2::new(
        if pos.x > center.x { pos.x - offset } else { pos.x + offset },
        if pos.y > center.y { pos.y - offset } else { pos.y + offset },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::grid::SolidMask;

    fn sim_with(grid: Grid, positions: &[(f32, f32)]) -> FlipSimulation {
        let seeds: Vec<(Vec2, Vec2)> = positions
            .iter()
            .map(|&(x, y)| (Vec2::new(x, y), Vec2::ZERO))
            .collect();
        FlipSimulation::from_particles(grid, seeds, SimConfig::default()).unwrap()
    }

    fn distance(sim: &FlipSimulation, a: usize, b: usize) -> f32 {
        let pa = sim.particle(a).unwrap().position();
        let pb = sim.particle(b).unwrap().position();
        (pa - pb).length()
    }

    #[test]
    fn overlapping_pair_is_pushed_to_contact_distance() {
        let mut sim = sim_with(Grid::bordered(10, 10).unwrap(), &[(5.0, 5.0), (5.3, 5.0)]);
        let stats = sim.resolve_collisions_pass();

        assert!(stats.contacts >= 1);
        assert!(distance(&sim, 0, 1) >= 1.0 - 1e-4, "distance {}", distance(&sim, 0, 1));
        // Symmetric push, midpoint unchanged
        let mid = 0.5 * (sim.particle(0).unwrap().position().x + sim.particle(1).unwrap().position().x);
        assert!((mid - 5.15).abs() < 1e-4);
    }

    #[test]
    fn distant_pair_is_untouched() {
        let mut sim = sim_with(Grid::bordered(10, 10).unwrap(), &[(3.0, 5.0), (4.5, 5.0)]);
        let stats = sim.resolve_collisions_pass();
        assert_eq!(stats, CollisionStats::default());
        assert_eq!(sim.particle(0).unwrap().position(), Vec2::new(3.0, 5.0));
    }

    #[test]
    fn coincident_pair_is_nudged_apart() {
        let mut sim = sim_with(Grid::bordered(10, 10).unwrap(), &[(3.0, 3.0), (3.0, 3.0)]);
        sim.resolve_collisions_pass();
        assert!(distance(&sim, 0, 1) > 0.9, "distance {}", distance(&sim, 0, 1));
    }

    #[test]
    fn wall_side_particle_stays_and_partner_takes_full_push() {
        // Particle 0 hugs the left border (x = 1 is the first open column).
        let mut sim = sim_with(Grid::bordered(10, 10).unwrap(), &[(1.1, 5.0), (1.5, 5.0)]);
        sim.resolve_collisions_pass();

        let a = sim.particle(0).unwrap().position();
        let b = sim.particle(1).unwrap().position();
        assert!((a.x - 1.1).abs() < 1e-3, "wall-side particle moved to {}", a.x);
        assert!(b.x - a.x >= 1.0 - 1e-4, "gap {}", b.x - a.x);
    }

    #[test]
    fn pair_boxed_in_by_solids_is_blocked() {
        let mask = SolidMask::from_ascii(&[
            "#####",
            "##.##",
            "#####",
        ])
        .unwrap();
        let grid = Grid::from_mask(&mask).unwrap();
        let mut sim = sim_with(grid, &[(2.3, 1.5), (2.7, 1.5)]);
        let stats = sim.resolve_collisions_pass();

        assert!(stats.blocked > 0);
        assert_eq!(sim.particle(0).unwrap().position(), Vec2::new(2.3, 1.5));
        assert_eq!(sim.particle(1).unwrap().position(), Vec2::new(2.7, 1.5));
    }

    #[test]
    fn contact_damps_velocity() {
        let grid = Grid::bordered(10, 10).unwrap();
        let mut sim = FlipSimulation::from_particles(
            grid,
            vec![(Vec2::new(5.0, 5.0), Vec2::new(1.0, 0.0)), (Vec2::new(5.3, 5.0), Vec2::ZERO)],
            SimConfig::default(),
        )
        .unwrap();
        sim.resolve_collisions_pass();
        let damping = SimConfig::default().collision_damping;
        let vx = sim.particle(0).unwrap().velocity.x;
        // Damped once for the contact, maybe again on the reverse visit
        assert!(vx <= damping + 1e-6 && vx >= damping * damping - 1e-6, "vx = {}", vx);
    }

    #[test]
    fn coincident_contact_damps_both_particles() {
        // The nudge alone clears the contact distance here.
        let grid = Grid::bordered(10, 10).unwrap();
        let v = Vec2::new(1.0, 0.0);
        let mut sim = FlipSimulation::from_particles(
            grid,
            vec![(Vec2::new(3.0, 3.0), v), (Vec2::new(3.0, 3.0), v)],
            SimConfig::default(),
        )
        .unwrap();
        let stats = sim.resolve_collisions_pass();
        assert_eq!(stats.contacts, 1);
        assert!(distance(&sim, 0, 1) >= 1.0);

        let damping = SimConfig::default().collision_damping;
        for id in 0..2 {
            let vx = sim.particle(id).unwrap().velocity.x;
            assert!((vx - damping).abs() < 1e-6, "particle {} vx = {}", id, vx);
        }
    }
}
