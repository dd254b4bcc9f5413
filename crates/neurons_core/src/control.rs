//! Control surface adapter.
//!
//! Front ends translate widget or keyboard input into [`ParamEdit`]s and hand
//! them to [`crate::Simulation::apply`]. Bounds are checked here, before the
//! simulation is touched.

use core::fmt;

use crate::color::Rgb;
use crate::config::{bounds, NeuronConfig};
use crate::error::ConfigError;

/// A single committed parameter change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEdit {
    NeuronCount(u32),
    ActiveRatio(f32),
    ActiveLightFactor(f32),
    CycleSpread(u32),
    CurveSpread(u32),
    BaseColor(Rgb),
    CoreColor(Rgb),
}

/// What applying an edit did to the running simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The generation was replaced
    Rebuilt,
    /// Per-neuron fields were recomputed in place
    Recomputed,
    /// Picked up on the next tick
    Live,
    /// Same value as before
    Unchanged,
}

impl ParamEdit {
    pub fn name(&self) -> &'static str {
        match self {
            ParamEdit::NeuronCount(_) => "neuron_count",
            ParamEdit::ActiveRatio(_) => "active_ratio",
            ParamEdit::ActiveLightFactor(_) => "active_light_factor",
            ParamEdit::CycleSpread(_) => "cycle_spread",
            ParamEdit::CurveSpread(_) => "curve_spread",
            ParamEdit::BaseColor(_) => "base_color",
            ParamEdit::CoreColor(_) => "core_color",
        }
    }

    /// Parse a color edit from control-surface text; malformed colors fall
    /// back to neutral instead of failing.
    pub fn base_color_from_str(hex: &str) -> Self {
        ParamEdit::BaseColor(Rgb::parse_or_neutral(hex))
    }

    pub fn core_color_from_str(hex: &str) -> Self {
        ParamEdit::CoreColor(Rgb::parse_or_neutral(hex))
    }

    /// Check the edit against the control bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let candidate = self.write_into(NeuronConfig::default());
        candidate.validate()
    }

    /// Whether the edit changes `config`.
    pub fn differs_from(&self, config: &NeuronConfig) -> bool {
        self.write_into(config.clone()) != *config
    }

    pub(crate) fn write_into(&self, mut config: NeuronConfig) -> NeuronConfig {
        match *self {
            ParamEdit::NeuronCount(v) => config.neuron_count = v,
            ParamEdit::ActiveRatio(v) => config.active_ratio = v,
            ParamEdit::ActiveLightFactor(v) => config.active_light_factor = v,
            ParamEdit::CycleSpread(v) => config.cycle_spread = v,
            ParamEdit::CurveSpread(v) => config.curve_spread = v,
            ParamEdit::BaseColor(c) => config.base_color = c,
            ParamEdit::CoreColor(c) => config.core_color = Some(c),
        }
        config
    }

    /// Clamp the value into its control bounds.
    pub fn clamped(self) -> Self {
        fn clamp<T: PartialOrd + Copy>(v: T, range: core::ops::RangeInclusive<T>) -> T {
            if v < *range.start() {
                *range.start()
            } else if v > *range.end() {
                *range.end()
            } else {
                v
            }
        }
        match self {
            ParamEdit::NeuronCount(v) => ParamEdit::NeuronCount(clamp(v, bounds::NEURON_COUNT)),
            ParamEdit::ActiveRatio(v) => ParamEdit::ActiveRatio(clamp(v, bounds::ACTIVE_RATIO)),
            ParamEdit::ActiveLightFactor(v) => {
                ParamEdit::ActiveLightFactor(clamp(v, bounds::ACTIVE_LIGHT_FACTOR))
            }
            ParamEdit::CycleSpread(v) => ParamEdit::CycleSpread(clamp(v, bounds::CYCLE_SPREAD)),
            ParamEdit::CurveSpread(v) => ParamEdit::CurveSpread(clamp(v, bounds::CURVE_SPREAD)),
            color @ (ParamEdit::BaseColor(_) | ParamEdit::CoreColor(_)) => color,
        }
    }
}

impl fmt::Display for ParamEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamEdit::NeuronCount(v) | ParamEdit::CycleSpread(v) | ParamEdit::CurveSpread(v) => {
                write!(f, "{}={}", self.name(), v)
            }
            ParamEdit::ActiveRatio(v) | ParamEdit::ActiveLightFactor(v) => {
                write!(f, "{}={:.1}", self.name(), v)
            }
            ParamEdit::BaseColor(c) | ParamEdit::CoreColor(c) => write!(f, "{}={}", self.name(), c),
        }
    }
}

/// Pending neuron-count edit that is only committed on release.
///
/// Intermediate values while a slider is dragged or a key is held do not
/// rebuild; `commit` yields the edit once.
#[derive(Debug, Clone, Default)]
pub struct CountDebouncer {
    pending: Option<u32>,
}

impl CountDebouncer {
    pub fn nudge(&mut self, current: u32, delta: i32) -> u32 {
        let base = self.pending.unwrap_or(current) as i64;
        let next = (base + delta as i64).clamp(
            *bounds::NEURON_COUNT.start() as i64,
            *bounds::NEURON_COUNT.end() as i64,
        ) as u32;
        self.pending = Some(next);
        next
    }

    pub fn pending(&self) -> Option<u32> {
        self.pending
    }

    pub fn commit(&mut self) -> Option<ParamEdit> {
        self.pending.take().map(ParamEdit::NeuronCount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bounds() {
        assert!(ParamEdit::NeuronCount(20).validate().is_ok());
        assert!(ParamEdit::NeuronCount(19).validate().is_err());
        assert!(ParamEdit::ActiveRatio(0.0).validate().is_err());
        assert!(ParamEdit::CurveSpread(0).validate().is_err());
        assert!(ParamEdit::base_color_from_str("garbage").validate().is_ok());
    }

    #[test]
    fn test_clamped() {
        assert_eq!(ParamEdit::NeuronCount(9000).clamped(), ParamEdit::NeuronCount(500));
        assert_eq!(ParamEdit::ActiveRatio(0.2).clamped(), ParamEdit::ActiveRatio(1.0));
        assert_eq!(ParamEdit::CycleSpread(7).clamped(), ParamEdit::CycleSpread(7));
    }

    #[test]
    fn test_debouncer_commits_once() {
        let mut d = CountDebouncer::default();
        assert_eq!(d.nudge(200, 10), 210);
        assert_eq!(d.nudge(200, 10), 220);
        assert_eq!(d.nudge(200, -1000), 20);
        assert_eq!(d.commit(), Some(ParamEdit::NeuronCount(20)));
        assert_eq!(d.commit(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamEdit::ActiveRatio(3.0).to_string(), "active_ratio=3.0");
        assert_eq!(
            ParamEdit::BaseColor(Rgb::new(0, 0, 255)).to_string(),
            "base_color=#0000ff"
        );
    }
}
