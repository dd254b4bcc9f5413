use crate::config::FPS_FILTER;

/// Exponentially smoothed frames-per-second estimate.
///
/// Display only; nothing in the simulation reads it back.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    fps: f64,
    filter: f64,
    last_frame_ms: Option<f64>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(FPS_FILTER)
    }
}

impl FpsMeter {
    pub fn new(filter: f64) -> Self {
        FpsMeter {
            fps: 0.0,
            filter: filter.max(1.0),
            last_frame_ms: None,
        }
    }

    /// Record a frame presented at `now_ms` (any monotonic millisecond clock).
    pub fn record(&mut self, now_ms: f64) {
        if let Some(last) = self.last_frame_ms {
            let elapsed = now_ms - last;
            if elapsed > 0.0 {
                let instant = 1000.0 / elapsed;
                self.fps += (instant - self.fps) / self.filter;
            }
        }
        self.last_frame_ms = Some(now_ms);
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Throttles the FPS readout to one publication per interval.
#[derive(Debug, Clone)]
pub struct FpsReadout {
    interval_ms: f64,
    last_publish_ms: Option<f64>,
}

impl Default for FpsReadout {
    fn default() -> Self {
        Self::every(1000.0)
    }
}

impl FpsReadout {
    pub fn every(interval_ms: f64) -> Self {
        FpsReadout {
            interval_ms,
            last_publish_ms: None,
        }
    }

    /// Returns the formatted readout when the interval has elapsed.
    pub fn poll(&mut self, now_ms: f64, meter: &FpsMeter) -> Option<String> {
        let due = match self.last_publish_ms {
            None => true,
            Some(last) => now_ms - last >= self.interval_ms,
        };
        if !due {
            return None;
        }
        self.last_publish_ms = Some(now_ms);
        Some(format_fps(meter.fps()))
    }
}

pub fn format_fps(fps: f64) -> String {
    format!("{:.1} fps", fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_towards_frame_rate() {
        let mut meter = FpsMeter::default();
        let mut now = 0.0;
        for _ in 0..2000 {
            meter.record(now);
            now += 1000.0 / 60.0;
        }
        assert!((meter.fps() - 60.0).abs() < 0.5, "fps = {}", meter.fps());
    }

    #[test]
    fn test_single_step_smoothing() {
        let mut meter = FpsMeter::new(50.0);
        meter.record(0.0);
        meter.record(10.0);
        // 100 fps instantaneous, 1/50 of the way from zero
        assert!((meter.fps() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_non_monotonic_clock() {
        let mut meter = FpsMeter::default();
        meter.record(100.0);
        meter.record(100.0);
        meter.record(50.0);
        assert_eq!(meter.fps(), 0.0);
    }

    #[test]
    fn test_readout_once_per_second() {
        let meter = FpsMeter::default();
        let mut readout = FpsReadout::default();
        assert_eq!(readout.poll(0.0, &meter).as_deref(), Some("0.0 fps"));
        assert!(readout.poll(500.0, &meter).is_none());
        assert!(readout.poll(999.0, &meter).is_none());
        assert!(readout.poll(1000.0, &meter).is_some());
    }
}
