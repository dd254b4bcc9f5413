//! Headless neuron field runner.
//!
//! Drives a [`Simulation`] without a window, collecting one [`FrameStats`]
//! row per tick. Rows can be written to CSV for offline inspection of firing
//! rhythms and propagation.

use std::ops::ControlFlow;
use std::path::Path;

use csv::Writer;
use neurons_core::scheduler::drive;
use neurons_core::{
    ConfigError, FrameScheduler, NeuronConfig, Point, Rgb, Simulation, Surface, SurfaceSize,
};
use serde::Serialize;
use tracing::info;

/// Surface that only counts what the current frame would have drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSurface {
    pub curves: u32,
    pub circles: u32,
}

impl Surface for StatsSurface {
    fn clear(&mut self, _size: SurfaceSize) {
        self.curves = 0;
        self.circles = 0;
    }

    fn stroke_quadratic(
        &mut self,
        _from: Point,
        _control: Point,
        _to: Point,
        _width: f32,
        _color: Rgb,
    ) {
        self.curves += 1;
    }

    fn fill_circle(&mut self, _center: Point, _radius: f32, _color: Rgb) {
        self.circles += 1;
    }
}

/// One row of per-frame output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    pub time_ms: f64,
    pub active: u32,
    pub fired: u32,
    pub propagated: u32,
    pub curves: u32,
    pub circles: u32,
    pub fps: f64,
}

/// Aggregate over a whole run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub neurons: usize,
    pub total_fired: u64,
    pub total_propagated: u64,
    pub mean_active_fraction: f64,
    pub final_fps: f64,
}

impl RunSummary {
    fn from_stats(stats: &[FrameStats], neurons: usize, final_fps: f64) -> Self {
        let frames = stats.len() as u64;
        let total_fired = stats.iter().map(|s| s.fired as u64).sum();
        let total_propagated = stats.iter().map(|s| s.propagated as u64).sum();
        let mean_active_fraction = if frames == 0 || neurons == 0 {
            0.0
        } else {
            let active: u64 = stats.iter().map(|s| s.active as u64).sum();
            active as f64 / (frames as f64 * neurons as f64)
        };
        RunSummary {
            frames,
            neurons,
            total_fired,
            total_propagated,
            mean_active_fraction,
            final_fps,
        }
    }
}

/// A simulation plus the counting surface it draws into.
pub struct HeadlessRun {
    sim: Simulation,
    surface: StatsSurface,
}

impl HeadlessRun {
    pub fn new(config: NeuronConfig, size: SurfaceSize) -> Result<Self, ConfigError> {
        Ok(HeadlessRun {
            sim: Simulation::new(config, size)?,
            surface: StatsSurface::default(),
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    /// Tick `frames` times, pacing with `scheduler`.
    pub fn run<Sch>(&mut self, frames: u64, scheduler: &mut Sch) -> (Vec<FrameStats>, RunSummary)
    where
        Sch: FrameScheduler + ?Sized,
    {
        self.run_until(frames, scheduler, |_| false)
    }

    /// Like [`HeadlessRun::run`], but stops early once `stop` returns `true`
    /// for a frame. That frame is still recorded.
    ///
    /// `frames` is only an upper bound; rows are allocated as frames run.
    pub fn run_until<Sch, F>(
        &mut self,
        frames: u64,
        scheduler: &mut Sch,
        mut stop: F,
    ) -> (Vec<FrameStats>, RunSummary)
    where
        Sch: FrameScheduler + ?Sized,
        F: FnMut(&FrameStats) -> bool,
    {
        let mut stats = Vec::new();

        drive(
            &mut self.sim,
            scheduler,
            &mut self.surface,
            Some(frames),
            |sim, surface, report, now_ms| {
                let row = FrameStats {
                    frame: report.frame,
                    time_ms: now_ms,
                    active: report.active,
                    fired: report.fired,
                    propagated: report.propagated,
                    curves: surface.curves,
                    circles: surface.circles,
                    fps: sim.fps(),
                };
                let done = stop(&row);
                stats.push(row);
                if done {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        let summary = RunSummary::from_stats(&stats, self.sim.generation().len(), self.sim.fps());
        info!(
            frames = summary.frames,
            neurons = summary.neurons,
            fired = summary.total_fired,
            propagated = summary.total_propagated,
            mean_active = summary.mean_active_fraction,
            "Headless run finished"
        );
        (stats, summary)
    }
}

/// Write per-frame rows with a header line.
pub fn write_csv(path: impl AsRef<Path>, stats: &[FrameStats]) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_path(path)?;
    for row in stats {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
