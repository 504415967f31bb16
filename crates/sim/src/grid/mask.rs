//! Solid/open layout of the LED matrix.

use crate::error::SimError;

/// Which cells are walls. The outer ring is always solid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolidMask {
    width: usize,
    height: usize,
    solid: Vec<bool>,
}

impl SolidMask {
    /// Open interior surrounded by a one-cell solid border.
    pub fn bordered(width: usize, height: usize) -> Result<Self, SimError> {
        Self::from_cells(width, height, vec![false; width * height])
    }

    /// Build from row-major flags (`true` = solid). The border is forced solid.
    pub fn from_cells(width: usize, height: usize, solid: Vec<bool>) -> Result<Self, SimError> {
        if width < 3 || height < 3 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        if solid.len() != width * height {
            return Err(SimError::MaskSizeMismatch {
                expected: width * height,
                found: solid.len(),
            });
        }

        let mut mask = Self { width, height, solid };
        mask.force_border();
        Ok(mask)
    }

    /// Parse a picture of the mask, one string per row from the top.
    ///
    /// `#` marks a solid cell, any other character is open. All rows must
    /// have the same length.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, SimError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());

        if rows.iter().any(|row| row.chars().count() != width) {
            return Err(SimError::MaskSizeMismatch {
                expected: width * height,
                found: rows.iter().map(|row| row.chars().count()).sum(),
            });
        }

        let solid = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();

        Self::from_cells(width, height, solid)
    }

    fn force_border(&mut self) {
        for x in 0..self.width {
            self.solid[x] = true;
            self.solid[(self.height - 1) * self.width + x] = true;
        }
        for y in 0..self.height {
            self.solid[y * self.width] = true;
            self.solid[y * self.width + self.width - 1] = true;
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Out-of-range coordinates count as solid.
    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.solid[y * self.width + x]
    }

    pub fn set_solid(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.solid[y * self.width + x] = true;
        }
    }

    /// Mark a rectangle solid, clipped to the mask.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for yy in y..(y + h).min(self.height) {
            for xx in x..(x + w).min(self.width) {
                self.solid[yy * self.width + xx] = true;
            }
        }
    }

    pub fn open_count(&self) -> usize {
        self.solid.iter().filter(|&&s| !s).count()
    }
}
