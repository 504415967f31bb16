//! Bilinear stencils on the staggered faces.
//!
//! A horizontal sample reads the four u faces around a point, a vertical
//! sample reads the four v faces. The stencil root is the top-left node:
//! - u nodes sit at (x, y + 0.5), so the root row is the cell's own row when
//!   the point is in the lower half of the cell, otherwise the row above
//! - v nodes sit at (x + 0.5, y), so the root column is the cell's own column
//!   when the point is in the right half, otherwise the column to the left

use glam::Vec2;

use super::Grid;

/// Which staggered velocity component a stencil samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Four nodes and their bilinear weights.
///
/// Node order is top-left, top-right, bottom-left, bottom-right. Weights are
/// non-negative and sum to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    pub nodes: [usize; 4],
    pub weights: [f32; 4],
}

impl Stencil {
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.nodes.iter().copied().zip(self.weights.iter().copied())
    }
}

impl Grid {
    /// Stencil for sampling the `axis` component at `pos`.
    pub fn stencil(&self, pos: Vec2, axis: Axis) -> Stencil {
        let cx = (pos.x.max(0.0) as usize).min(self.width() - 1);
        let cy = (pos.y.max(0.0) as usize).min(self.height() - 1);
        let frac_x = pos.x - cx as f32;
        let frac_y = pos.y - cy as f32;

        let (root_x, root_y, dx, dy) = match axis {
            Axis::Horizontal => {
                let root_y = if frac_y > 0.5 { cy } else { cy.saturating_sub(1) };
                (cx, root_y, frac_x, pos.y - (root_y as f32 + 0.5))
            }
            Axis::Vertical => {
                let root_x = if frac_x > 0.5 { cx } else { cx.saturating_sub(1) };
                (root_x, cy, pos.x - (root_x as f32 + 0.5), frac_y)
            }
        };
        // Only off by a hair in the border ring, where no particle can be.
        let dx = dx.clamp(0.0, 1.0);
        let dy = dy.clamp(0.0, 1.0);

        let top_left = self.cell_index(root_x, root_y);
        let top_right = self.right(top_left);
        let bottom_left = self.down(top_left);
        let bottom_right = self.right(bottom_left);

        let sx = 1.0 - dx;
        let sy = 1.0 - dy;

        Stencil {
            nodes: [top_left, top_right, bottom_left, bottom_right],
            weights: [sx * sy, dx * sy, sx * dy, dx * dy],
        }
    }
}
