//! Turning the grid into LED brightness, and pushing frames to a display.

use std::io::Write;

use ledflow_sim::{Cell, CellState, Grid};

/// Brightness step per particle in a water cell.
const LEVEL_PER_PARTICLE: u32 = 4;

/// Brightness of one LED.
///
/// Water cells start at 1 so a single particle is visible and get brighter
/// with every extra particle. Air and solid cells are dark.
pub fn cell_brightness(cell: &Cell) -> u8 {
    match cell.state {
        CellState::Water => (1 + LEVEL_PER_PARTICLE * cell.particle_count).min(255) as u8,
        CellState::Air | CellState::Solid => 0,
    }
}

/// One frame of LED levels plus the cell states they came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrightnessFrame {
    width: usize,
    height: usize,
    levels: Vec<u8>,
    states: Vec<CellState>,
}

impl BrightnessFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            levels: vec![0; width * height],
            states: vec![CellState::Air; width * height],
        }
    }

    /// Frame with every LED at `level`.
    pub fn filled(width: usize, height: usize, level: u8) -> Self {
        Self {
            levels: vec![level; width * height],
            ..Self::new(width, height)
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn level(&self, x: usize, y: usize) -> u8 {
        self.levels[y * self.width + x]
    }

    /// Overwrite this frame from the grid. Sizes must match.
    pub fn render_from(&mut self, grid: &Grid) {
        debug_assert_eq!(grid.len(), self.levels.len());
        for ((level, state), cell) in self.levels.iter_mut().zip(self.states.iter_mut()).zip(grid.cells()) {
            *level = cell_brightness(cell);
            *state = cell.state;
        }
    }

    /// Text picture: `#` solid, space dark, `.:*@` by rising brightness.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                out.push(match (self.states[idx], self.levels[idx]) {
                    (CellState::Solid, _) => '#',
                    (_, 0) => ' ',
                    (_, 1..=5) => '.',
                    (_, 6..=9) => ':',
                    (_, 10..=17) => '*',
                    _ => '@',
                });
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    /// Frame size does not match the display.
    SizeMismatch { expected: usize, found: usize },
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "Display write failed: {}", e),
            SinkError::SizeMismatch { expected, found } => {
                write!(f, "Frame has {} LEDs, display has {}", found, expected)
            }
        }
    }
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e)
    }
}

/// LED display driver.
pub trait LedSink {
    fn push(&mut self, frame: &BrightnessFrame) -> Result<(), SinkError>;
}

/// Prints every n-th frame as ASCII art.
pub struct ConsoleSink<W: Write> {
    out: W,
    every: u32,
    frames: u32,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout(every: u32) -> Self {
        Self::new(std::io::stdout(), every)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, every: u32) -> Self {
        Self {
            out,
            every: every.max(1),
            frames: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LedSink for ConsoleSink<W> {
    fn push(&mut self, frame: &BrightnessFrame) -> Result<(), SinkError> {
        self.frames = self.frames.wrapping_add(1);
        if self.frames % self.every != 0 {
            return Ok(());
        }
        writeln!(self.out, "frame {}", self.frames)?;
        self.out.write_all(frame.to_ascii().as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use ledflow_sim::{FlipSimulation, SimConfig};

    #[test]
    fn brightness_grows_with_particle_count() {
        let grid = Grid::bordered(5, 5).unwrap();
        let mut cell = *grid.cell(2, 2);

        cell.state = CellState::Air;
        assert_eq!(cell_brightness(&cell), 0);

        cell.state = CellState::Water;
        cell.particle_count = 1;
        assert_eq!(cell_brightness(&cell), 5);
        cell.particle_count = 3;
        assert_eq!(cell_brightness(&cell), 13);
        cell.particle_count = 500;
        assert_eq!(cell_brightness(&cell), 255);

        assert_eq!(cell_brightness(grid.cell(0, 0)), 0);
    }

    #[test]
    fn frame_mirrors_simulation_grid() {
        let mut sim = FlipSimulation::from_particles(
            Grid::bordered(6, 5).unwrap(),
            vec![(Vec2::new(2.5, 2.5), Vec2::ZERO), (Vec2::new(4.2, 1.5), Vec2::ZERO)],
            SimConfig::default(),
        )
        .unwrap();
        sim.step(&Vec2::ZERO);

        let mut frame = BrightnessFrame::new(6, 5);
        frame.render_from(sim.grid());
        let lit = frame.levels().iter().filter(|&&l| l > 0).count();
        assert_eq!(lit, 2);

        let ascii = frame.to_ascii();
        assert_eq!(ascii.lines().count(), 5);
        assert_eq!(ascii.lines().next(), Some("######"));
        assert_eq!(ascii.matches('.').count(), 2);
    }

    #[test]
    fn console_sink_prints_every_nth_frame() {
        let frame = BrightnessFrame::filled(3, 3, 9);
        let mut sink = ConsoleSink::new(Vec::new(), 2);
        for _ in 0..4 {
            sink.push(&frame).unwrap();
        }
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.matches("frame").count(), 2);
        assert!(text.contains("frame 4"));
    }
}
