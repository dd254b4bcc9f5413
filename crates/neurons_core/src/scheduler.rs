//! Frame pacing.
//!
//! A scheduler yields one timestamp per frame; [`drive`] calls
//! [`Simulation::tick`] once per timestamp. Hosts with their own refresh
//! loop (Bevy, `requestAnimationFrame`) call `tick` directly instead.

use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

use crate::render::Surface;
use crate::simulation::{Simulation, TickReport};

/// Fallback refresh rate when no display refresh signal is available.
pub const FALLBACK_HZ: u32 = 60;

/// Source of frame timestamps
pub trait FrameScheduler {
    /// Wait until the next frame is due and return its time in milliseconds
    /// since the scheduler started.
    fn next_frame(&mut self) -> f64;
}

/// Sleeps to hold a fixed frame rate.
///
/// Late frames are not caught up: after a stall the schedule restarts from
/// the current instant.
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    interval: Duration,
    start: Instant,
    next: Instant,
}

impl FixedRateScheduler {
    pub fn new(hz: u32) -> Self {
        let interval = Duration::from_secs_f64(1.0 / hz.max(1) as f64);
        let start = Instant::now();
        FixedRateScheduler {
            interval,
            start,
            next: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedRateScheduler {
    fn default() -> Self {
        Self::new(FALLBACK_HZ)
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> f64 {
        let now = Instant::now();
        if now < self.next {
            thread::sleep(self.next - now);
        }
        let frame_time = Instant::now();
        self.next += self.interval;
        if self.next < frame_time {
            self.next = frame_time + self.interval;
        }
        frame_time.duration_since(self.start).as_secs_f64() * 1000.0
    }
}

/// Runs frames back to back on a virtual clock advancing by a fixed step.
///
/// Used for headless runs and tests where wall-clock pacing is unwanted.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    step_ms: f64,
    now_ms: f64,
}

impl SteppedClock {
    pub fn new(hz: u32) -> Self {
        SteppedClock {
            step_ms: 1000.0 / hz.max(1) as f64,
            now_ms: 0.0,
        }
    }
}

impl Default for SteppedClock {
    fn default() -> Self {
        Self::new(FALLBACK_HZ)
    }
}

impl FrameScheduler for SteppedClock {
    fn next_frame(&mut self) -> f64 {
        let now = self.now_ms;
        self.now_ms += self.step_ms;
        now
    }
}

/// Tick `sim` once per scheduled frame until `frames` have run or
/// `on_frame` breaks. `on_frame` sees the surface right after the frame was
/// drawn. Returns the number of frames ticked.
pub fn drive<Sch, S, F>(
    sim: &mut Simulation,
    scheduler: &mut Sch,
    surface: &mut S,
    frames: Option<u64>,
    mut on_frame: F,
) -> u64
where
    Sch: FrameScheduler + ?Sized,
    S: Surface + ?Sized,
    F: FnMut(&Simulation, &S, &TickReport, f64) -> ControlFlow<()>,
{
    let mut ran = 0;
    while frames.map_or(true, |limit| ran < limit) {
        let now_ms = scheduler.next_frame();
        let report = sim.tick(surface);
        sim.record_frame(now_ms);
        ran += 1;
        if on_frame(sim, surface, &report, now_ms).is_break() {
            break;
        }
    }
    ran
}
