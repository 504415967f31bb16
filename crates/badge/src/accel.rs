//! Accelerometer samples and sources.
//!
//! Samples are raw signed counts, left-justified as the sensor reports them.
//! The sim context turns them into a gravity vector with a configured scale.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Raw counts for one g at the sensor's +-8g range, left-justified.
pub const COUNTS_PER_G: f32 = 4096.0;

/// One accelerometer reading in raw counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AccelSample {
    /// In-plane acceleration in cells per second squared. The sensor's x and
    /// y axes line up with the grid's.
    pub fn to_acceleration(&self, scale: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * scale
    }
}

#[derive(Debug)]
pub enum SensorError {
    /// The bus transaction failed.
    Bus(String),
    /// The sensor answered with a different device id.
    UnexpectedDevice(u8),
}

impl std::fmt::Display for SensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorError::Bus(msg) => write!(f, "Sensor bus error: {}", msg),
            SensorError::UnexpectedDevice(id) => write!(f, "Unexpected sensor id 0x{:02x}", id),
        }
    }
}

impl std::error::Error for SensorError {}

/// Something that can be polled for acceleration.
pub trait AccelSource {
    fn read(&mut self) -> Result<AccelSample, SensorError>;
}

/// Always reports the same reading.
#[derive(Clone, Copy, Debug)]
pub struct FixedSource(pub AccelSample);

impl AccelSource for FixedSource {
    fn read(&mut self) -> Result<AccelSample, SensorError> {
        Ok(self.0)
    }
}

/// Synthetic badge slowly rocking back and forth, with sensor noise.
///
/// Stands in for real hardware when running on a desktop.
pub struct TiltSource {
    rng: ChaCha8Rng,
    phase: f32,
    /// Radians per poll.
    rate: f32,
    /// Maximum tilt away from upright, in radians.
    amplitude: f32,
    /// Peak noise in raw counts.
    noise: i16,
}

impl TiltSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: 0.0,
            rate: 0.01,
            amplitude: 1.2,
            noise: 40,
        }
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

impl AccelSource for TiltSource {
    fn read(&mut self) -> Result<AccelSample, SensorError> {
        self.phase += self.rate;
        let tilt = self.amplitude * self.phase.sin();

        let mut jitter = || self.rng.gen_range(-self.noise..=self.noise);
        let x = COUNTS_PER_G * tilt.sin();
        let y = COUNTS_PER_G * tilt.cos();
        Ok(AccelSample {
            x: (x as i16).saturating_add(jitter()),
            y: (y as i16).saturating_add(jitter()),
            z: jitter(),
        })
    }
}
