//! Attractor force field that pulls fluid into an image.
//!
//! Each weighted cell of a low-res image attracts every point with a
//! strength falling off with the fourth power of distance. The field is
//! precomputed once on a grid three times finer than the LED grid and
//! sampled bilinearly, so per-particle lookups are cheap.

use glam::Vec2;

use ledflow_sim::{ForceField, Particle, SimError};

/// High-res samples per LED cell along each axis.
pub const UPSCALE: usize = 3;

/// Converts the field's per-tick velocity nudge into an acceleration at 60 Hz.
const FORCE_GAIN: f32 = 60.0;

/// Per-tick velocity factor for particles sitting on a marked image cell.
pub const IMAGE_DAMPING: f32 = 0.995;

/// Precomputed attraction toward a weighted image.
pub struct AttractorField {
    width: usize,
    height: usize,
    forces: Vec<Vec2>,
    /// Low-res weight map, one entry per LED cell.
    cell_width: usize,
    weights: Vec<u8>,
}

impl AttractorField {
    /// Build from per-cell weights (row-major, `width * height` entries, 0 = no pull).
    pub fn from_weights(width: usize, height: usize, weights: &[u8], strength: f32) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        if weights.len() != width * height {
            return Err(SimError::MaskSizeMismatch {
                expected: width * height,
                found: weights.len(),
            });
        }

        let hi_w = width * UPSCALE;
        let hi_h = height * UPSCALE;
        let sources: Vec<(Vec2, f32)> = weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0)
            .map(|(idx, &w)| {
                let x = idx % width;
                let y = idx / width;
                let center = Vec2::new(
                    (x * UPSCALE + UPSCALE / 2) as f32,
                    (y * UPSCALE + UPSCALE / 2) as f32,
                );
                (center, w as f32)
            })
            .collect();

        let mut forces = Vec::with_capacity(hi_w * hi_h);
        for hy in 0..hi_h {
            for hx in 0..hi_w {
                let here = Vec2::new(hx as f32, hy as f32);
                let mut total = Vec2::ZERO;
                for &(center, weight) in &sources {
                    let d = center - here;
                    let falloff = d.x.powi(4) + d.y.powi(4) + 1.0;
                    total += d * (strength * weight / falloff);
                }
                forces.push(total);
            }
        }

        log::info!(
            "Attractor field: {} sources, {}x{} samples",
            sources.len(),
            hi_w,
            hi_h
        );

        Ok(Self {
            width: hi_w,
            height: hi_h,
            forces,
            cell_width: width,
            weights: weights.to_vec(),
        })
    }

    /// Parse an image where digits `1`-`9` are weights and anything else is 0.
    pub fn from_ascii(rows: &[&str], strength: f32) -> Result<Self, SimError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let weights: Vec<u8> = rows
            .iter()
            .flat_map(|row| {
                row.chars()
                    .map(|c| c.to_digit(10).map_or(0, |d| d as u8))
            })
            .collect();
        Self::from_weights(width, height, &weights, strength)
    }

    /// Velocity factor for a particle in `cell`: [`IMAGE_DAMPING`] on marked
    /// cells, 1 elsewhere and outside the image.
    pub fn damping_at(&self, cell: (usize, usize)) -> f32 {
        let (x, y) = cell;
        let marked = x < self.cell_width
            && self
                .weights
                .get(y * self.cell_width + x)
                .map_or(false, |&w| w > 0);
        if marked {
            IMAGE_DAMPING
        } else {
            1.0
        }
    }

    /// Field value at a position in LED-cell units.
    pub fn sample(&self, pos: Vec2) -> Vec2 {
        // Sample h sits at the center of its sub-cell, (h + 0.5) / UPSCALE.
        let scale = UPSCALE as f32;
        let hx = (pos.x * scale - 0.5).clamp(0.0, (self.width - 1) as f32);
        let hy = (pos.y * scale - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = hx as usize;
        let y0 = hy as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = hx - x0 as f32;
        let fy = hy - y0 as f32;

        let at = |x: usize, y: usize| self.forces[y * self.width + x];
        let top = at(x0, y0).lerp(at(x1, y0), fx);
        let bottom = at(x0, y1).lerp(at(x1, y1), fx);
        top.lerp(bottom, fy)
    }
}

impl ForceField for AttractorField {
    fn acceleration(&self, particle: &Particle) -> Vec2 {
        self.sample(particle.position()) * FORCE_GAIN
    }
}
