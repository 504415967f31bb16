//! The two periodic contexts and the thread harness that runs them.
//!
//! - Sim context: read the latest acceleration, step the simulation under the
//!   current mode's force, render a frame, publish it. In attractor mode,
//!   particles resting on the image are slowed after each step.
//! - I/O context: poll the sensor, publish the sample, push the latest frame
//!   to the display.
//!
//! They share nothing but two [`DoubleBuffer`]s and a stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;

use ledflow_sim::{FlipSimulation, ForceField};

use crate::accel::{AccelSample, AccelSource};
use crate::config::{BadgeConfig, MAX_TICK_HZ, MIN_TICK_HZ};
use crate::field::AttractorField;
use crate::handoff::DoubleBuffer;
use crate::mode::{DisplayMode, ModeCycle};
use crate::render::{BrightnessFrame, LedSink};

/// Ticks between progress lines in the log.
const LOG_EVERY: u64 = 600;

/// Fixed-rate wakeups. An overrun schedules the next tick immediately and
/// re-anchors the schedule instead of firing a burst to catch up.
pub struct Ticker {
    period: Duration,
    next: Instant,
    overruns: u64,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now(),
            overruns: 0,
        }
    }

    /// Rates outside the accepted config range are clamped into it.
    pub fn from_hz(hz: f32) -> Self {
        let hz = if hz.is_nan() { MIN_TICK_HZ } else { hz.clamp(MIN_TICK_HZ, MAX_TICK_HZ) };
        Self::new(Duration::from_secs_f32(1.0 / hz))
    }

    /// Sleep until the next tick is due.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            if now - self.next > self.period {
                self.overruns += 1;
            }
            self.next = now + self.period;
        }
    }

    /// Ticks that started more than a full period late.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

/// State shared by both contexts.
pub struct Shared {
    pub accel: DoubleBuffer<AccelSample>,
    pub frame: DoubleBuffer<BrightnessFrame>,
    stop: AtomicBool,
}

impl Shared {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            accel: DoubleBuffer::new(AccelSample::default()),
            frame: DoubleBuffer::new(BrightnessFrame::new(width, height)),
            stop: AtomicBool::new(false),
        }
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimReport {
    pub ticks: u64,
    pub soft_faults: u64,
    pub late_ticks: u64,
    pub final_mode: Option<DisplayMode>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoReport {
    pub polls: u64,
    pub sensor_errors: u64,
    pub frames_pushed: u64,
    pub sink_errors: u64,
    pub late_ticks: u64,
}

/// Everything a finished run hands back.
pub struct BadgeReport {
    pub sim: SimReport,
    pub io: IoReport,
    pub simulation: FlipSimulation,
}

/// Sim context loop. Runs until `shared.request_stop()`.
pub fn run_sim_context(
    sim: &mut FlipSimulation,
    field: &AttractorField,
    shared: &Shared,
    config: &BadgeConfig,
) -> SimReport {
    let mut ticker = Ticker::from_hz(config.tick_hz);
    let mut modes = ModeCycle::new(config.modes);
    let mut sample = AccelSample::default();
    let mut back = BrightnessFrame::new(sim.grid().width(), sim.grid().height());
    let mut report = SimReport::default();

    log::info!("Sim context started at {} Hz", config.tick_hz);
    while !shared.should_stop() {
        ticker.wait();

        shared.accel.read_into(&mut sample);
        let gravity = sample.to_acceleration(config.accel_scale);
        let force: &dyn ForceField = match modes.mode() {
            DisplayMode::NormalGravity => &gravity,
            DisplayMode::ZeroGravity => &Vec2::ZERO,
            DisplayMode::Attractor => field,
        };
        let stats = sim.step(force);
        if modes.mode() == DisplayMode::Attractor {
            sim.damp_velocities(|p| field.damping_at(p.cell()));
        }

        back.render_from(sim.grid());
        shared.frame.publish(&mut back);
        modes.advance();

        report.ticks += 1;
        report.soft_faults += u64::from(stats.soft_faults());
        if report.ticks % LOG_EVERY == 0 {
            log::info!(
                "sim tick {}: mode {:?}, KE {:.2}, div {:.3}, {} soft faults so far",
                stats.tick,
                modes.mode(),
                stats.kinetic_energy,
                stats.divergence_after,
                report.soft_faults
            );
        }
    }

    report.late_ticks = ticker.overruns();
    report.final_mode = Some(modes.mode());
    log::info!("Sim context stopped after {} ticks", report.ticks);
    report
}

/// I/O context loop. Runs until `shared.request_stop()`.
pub fn run_io_context<S: AccelSource, K: LedSink>(
    source: &mut S,
    sink: &mut K,
    shared: &Shared,
    config: &BadgeConfig,
) -> IoReport {
    let mut ticker = Ticker::from_hz(config.tick_hz);
    let mut slot = AccelSample::default();
    let mut frame = shared.frame.snapshot();
    let mut report = IoReport::default();

    log::info!("I/O context started at {} Hz", config.tick_hz);
    while !shared.should_stop() {
        ticker.wait();

        report.polls += 1;
        match source.read() {
            Ok(sample) => {
                slot = sample;
                shared.accel.publish(&mut slot);
            }
            Err(e) => {
                report.sensor_errors += 1;
                log::warn!("Sensor read failed, keeping last sample: {}", e);
            }
        }

        shared.frame.read_into(&mut frame);
        match sink.push(&frame) {
            Ok(()) => report.frames_pushed += 1,
            Err(e) => {
                report.sink_errors += 1;
                log::warn!("Display push failed: {}", e);
            }
        }
    }

    report.late_ticks = ticker.overruns();
    log::info!("I/O context stopped after {} polls", report.polls);
    report
}

/// Run both contexts on their own threads until `config.run_seconds`
/// elapses, or forever if it is unset.
pub fn run_badge<S, K>(
    mut simulation: FlipSimulation,
    field: &AttractorField,
    mut source: S,
    mut sink: K,
    config: &BadgeConfig,
) -> BadgeReport
where
    S: AccelSource + Send,
    K: LedSink + Send,
{
    let shared = Shared::new(simulation.grid().width(), simulation.grid().height());

    let (sim, io) = thread::scope(|scope| {
        let sim_thread = scope.spawn(|| run_sim_context(&mut simulation, field, &shared, config));
        let io_thread = scope.spawn(|| run_io_context(&mut source, &mut sink, &shared, config));

        if let Some(secs) = config.run_seconds {
            thread::sleep(Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO));
            shared.request_stop();
        }

        let sim = sim_thread.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        let io = io_thread.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        (sim, io)
    });

    BadgeReport { sim, io, simulation }
}
