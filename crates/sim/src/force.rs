//! External accelerations applied during integration.

use glam::Vec2;

use crate::particle::Particle;

/// Source of per-particle acceleration, in cells per second squared.
///
/// Implementations must be cheap and pure: the integrator calls
/// `acceleration` once per particle per tick.
pub trait ForceField {
    fn acceleration(&self, particle: &Particle) -> Vec2;
}

/// Uniform acceleration, e.g. gravity from a tilt sensor.
impl ForceField for Vec2 {
    #[inline]
    fn acceleration(&self, _particle: &Particle) -> Vec2 {
        *self
    }
}

impl<F: ForceField + ?Sized> ForceField for &F {
    #[inline]
    fn acceleration(&self, particle: &Particle) -> Vec2 {
        (**self).acceleration(particle)
    }
}

/// Closures work as force fields.
pub struct FnField<F>(pub F);

impl<F: Fn(&Particle) -> Vec2> ForceField for FnField<F> {
    #[inline]
    fn acceleration(&self, particle: &Particle) -> Vec2 {
        (self.0)(particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particles;

    fn sample_particles() -> Particles {
        let mut particles = Particles::with_capacity(1, Vec2::new(8.0, 8.0));
        particles.push(Vec2::new(2.0, 6.0), Vec2::ZERO, 1.0);
        particles
    }

    #[test]
    fn constant_vector_ignores_particle() {
        let particles = sample_particles();
        let g = Vec2::new(0.0, 9.8);
        assert_eq!(g.acceleration(&particles.as_slice()[0]), g);
    }

    #[test]
    fn closure_field_sees_particle_position() {
        let particles = sample_particles();
        let toward_origin = FnField(|p: &Particle| -p.position());
        let field: &dyn ForceField = &toward_origin;
        assert_eq!(field.acceleration(&particles.as_slice()[0]), Vec2::new(-2.0, -6.0));
    }
}
