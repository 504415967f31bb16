//! Fluid particles and their fixed-capacity store.
//!
//! A particle's position and cell are kept in lockstep: every write goes
//! through [`Particle::set_position`], which clamps into the grid and
//! re-derives the cell. Velocity is a plain field since nothing depends on it.

use glam::Vec2;

use crate::physics::POSITION_EPSILON;

/// A water particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    id: u32,
    position: Vec2,
    cell: (usize, usize),
    /// Velocity in cells per second
    pub velocity: Vec2,
    diameter: f32,
}

impl Particle {
    /// Create a particle, clamping `position` into `bounds`.
    pub(crate) fn new(id: u32, position: Vec2, velocity: Vec2, diameter: f32, bounds: Vec2) -> Self {
        let mut particle = Self {
            id,
            position: Vec2::ZERO,
            cell: (0, 0),
            velocity,
            diameter,
        };
        particle.set_position(position, bounds);
        particle
    }

    /// Index of this particle in its store. Stable for the life of the simulation.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Cell containing the particle, `(floor(x), floor(y))`.
    #[inline]
    pub fn cell(&self) -> (usize, usize) {
        self.cell
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    /// Move the particle, clamping each axis to `[0, bound - POSITION_EPSILON]`
    /// and updating its cell.
    ///
    /// A NaN component leaves that axis where it was.
    pub(crate) fn set_position(&mut self, position: Vec2, bounds: Vec2) {
        let x = if position.x.is_nan() { self.position.x } else { position.x };
        let y = if position.y.is_nan() { self.position.y } else { position.y };
        self.position = clamp_to_bounds(Vec2::new(x, y), bounds);
        self.cell = (self.position.x as usize, self.position.y as usize);
    }

    /// Kinetic energy at unit mass
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.velocity.length_squared()
    }
}

/// Clamp a position into the half-open grid rectangle.
#[inline]
pub fn clamp_to_bounds(position: Vec2, bounds: Vec2) -> Vec2 {
    position.clamp(Vec2::ZERO, bounds - Vec2::splat(POSITION_EPSILON))
}

/// Collection of particles. Never grows or shrinks once the simulation is built.
#[derive(Clone, Debug)]
pub struct Particles {
    list: Vec<Particle>,
    bounds: Vec2,
}

impl Particles {
    pub(crate) fn with_capacity(capacity: usize, bounds: Vec2) -> Self {
        Self {
            list: Vec::with_capacity(capacity),
            bounds,
        }
    }

    /// Append a particle and return its id.
    pub(crate) fn push(&mut self, position: Vec2, velocity: Vec2, diameter: f32) -> u32 {
        let id = self.list.len() as u32;
        self.list
            .push(Particle::new(id, position, velocity, diameter, self.bounds));
        id
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Grid extent the positions are clamped to.
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn get(&self, id: usize) -> Option<&Particle> {
        self.list.get(id)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.list
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Particle> {
        self.list.iter()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.list
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.list.iter_mut()
    }

    /// Two distinct particles borrowed mutably at once.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Particle, &mut Particle) {
        debug_assert_ne!(a, b);
        if a < b {
            let (lo, hi) = self.list.split_at_mut(b);
            (&mut lo[a], &mut hi[0])
        } else {
            let (lo, hi) = self.list.split_at_mut(a);
            (&mut hi[0], &mut lo[b])
        }
    }

    /// Total kinetic energy at unit mass.
    pub fn kinetic_energy(&self) -> f32 {
        self.list.iter().map(Particle::kinetic_energy).sum()
    }
}
