//! Physical layout of the badge: which LEDs exist, and the attractor image.

use ledflow_sim::{SimError, SolidMask};

use crate::field::AttractorField;

pub const BADGE_WIDTH: usize = 14;
pub const BADGE_HEIGHT: usize = 34;

/// Pull strength of the attractor image.
pub const ATTRACTOR_STRENGTH: f32 = 10.0;

/// LED outline, top row first. The rounded bottom has no LEDs.
pub const BADGE_OUTLINE: [&str; BADGE_HEIGHT] = [
    "##############",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "#............#",
    "##..........##",
    "##..........##",
    "###........###",
    "#####....#####",
    "##############",
];

/// Attractor weights over the same grid: a ring with a bright core.
pub const ATTRACTOR_IMAGE: [&str; BADGE_HEIGHT] = [
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    ".....2222.....",
    "....222222....",
    "...22....22...",
    "...2......2...",
    "..22......22..",
    "..22..33..22..",
    "..22..33..22..",
    "..22......22..",
    "...2......2...",
    "...22....22...",
    "....222222....",
    ".....2222.....",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
    "..............",
];

pub fn badge_mask() -> Result<SolidMask, SimError> {
    SolidMask::from_ascii(&BADGE_OUTLINE)
}

pub fn attractor_field() -> Result<AttractorField, SimError> {
    AttractorField::from_ascii(&ATTRACTOR_IMAGE, ATTRACTOR_STRENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_has_expected_shape() {
        let mask = badge_mask().unwrap();
        assert_eq!((mask.width(), mask.height()), (BADGE_WIDTH, BADGE_HEIGHT));

        // Deepest open row per column, x = 1..=12
        let deepest = [28, 30, 31, 31, 32, 32, 32, 32, 31, 31, 30, 28];
        for (i, &max_y) in deepest.iter().enumerate() {
            let x = i + 1;
            assert!(!mask.is_solid(x, max_y), "column {} should be open at {}", x, max_y);
            assert!(mask.is_solid(x, max_y + 1), "column {} should close after {}", x, max_y);
            assert!(mask.is_solid(x, 0));
        }
        assert_eq!(mask.open_count(), deepest.iter().sum::<usize>());
    }

    #[test]
    fn attractor_image_fits_the_outline() {
        let mask = badge_mask().unwrap();
        for (y, row) in ATTRACTOR_IMAGE.iter().enumerate() {
            assert_eq!(row.len(), BADGE_WIDTH);
            for (x, c) in row.chars().enumerate() {
                if c != '.' {
                    assert!(!mask.is_solid(x, y), "attractor weight on solid ({}, {})", x, y);
                }
            }
        }
        assert!(attractor_field().is_ok());
    }
}
