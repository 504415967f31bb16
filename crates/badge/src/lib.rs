//! LED Fluid Badge - Runtime
//!
//! Runs the `ledflow_sim` fluid on a badge:
//! - [`accel`]: accelerometer samples and sources
//! - [`field`]: attractor image force field
//! - [`mode`]: gravity / zero-g / attractor cycle
//! - [`render`]: brightness frames and display sinks
//! - [`handoff`]: double-buffered exchange between contexts
//! - [`runtime`]: the two periodic contexts and their threads

pub mod accel;
pub mod config;
pub mod field;
pub mod handoff;
pub mod layout;
pub mod mode;
pub mod render;
pub mod runtime;

pub use accel::{AccelSample, AccelSource, FixedSource, SensorError, TiltSource};
pub use config::{BadgeConfig, ModeSchedule};
pub use field::AttractorField;
pub use handoff::DoubleBuffer;
pub use mode::{DisplayMode, ModeCycle};
pub use render::{BrightnessFrame, ConsoleSink, LedSink, SinkError};
pub use runtime::{run_badge, run_io_context, run_sim_context, BadgeReport, IoReport, Shared, SimReport, Ticker};
