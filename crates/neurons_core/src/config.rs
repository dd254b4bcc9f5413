use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

#[cfg(feature = "cli")]
use clap::Args;

use crate::color::Rgb;
use crate::error::ConfigError;

/// Minimum cycle length in frames; the random spread is added on top.
pub const BASE_CYCLE: u32 = 60;

/// Smoothing window for the FPS estimate (in samples).
pub const FPS_FILTER: f64 = 50.0;

/// Bounds enforced at the control surface.
pub mod bounds {
    use core::ops::RangeInclusive;

    pub const NEURON_COUNT: RangeInclusive<u32> = 20..=500;
    pub const ACTIVE_RATIO: RangeInclusive<f32> = 1.0..=10.0;
    pub const ACTIVE_LIGHT_FACTOR: RangeInclusive<f32> = 10.0..=100.0;
    pub const CYCLE_SPREAD: RangeInclusive<u32> = 0..=500;
    pub const CURVE_SPREAD: RangeInclusive<u32> = 1..=100;
    pub const NEURON_RADIUS: RangeInclusive<f32> = 1.0..=20.0;
    /// Below one half so the placement region never collapses.
    pub const INSET: RangeInclusive<f32> = 0.0..=0.49;
}

/// Tunable parameters of the neuron field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
#[serde(default)]
pub struct NeuronConfig {
    /// Number of neurons per generation
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 200))]
    pub neuron_count: u32,

    /// Divisor applied to the cycle period when a neuron fires
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 3.0))]
    pub active_ratio: f32,

    /// Lighten percentage at the peak of activation
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 80.0))]
    pub active_light_factor: f32,

    /// Random frames added to the base cycle of every neuron
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 300))]
    pub cycle_spread: u32,

    /// Curve control-point deviation (pixels)
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 50))]
    pub curve_spread: u32,

    /// Outer neuron radius (pixels)
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 5.0))]
    pub neuron_radius: f32,

    /// Base neuron color
    #[cfg_attr(feature = "cli", arg(long, default_value = "#43b565"))]
    pub base_color: Rgb,

    /// Core color; derived from the base color when absent
    #[cfg_attr(feature = "cli", arg(long))]
    pub core_color: Option<Rgb>,

    /// Fraction of the surface left empty on every side
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0.1))]
    pub inset: f32,

    /// RNG seed; entropy-seeded when absent
    #[cfg_attr(feature = "cli", arg(long))]
    pub seed: Option<u64>,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            neuron_count: 200,
            active_ratio: 3.0,
            active_light_factor: 80.0,
            cycle_spread: 300,
            curve_spread: 50,
            neuron_radius: 5.0,
            base_color: Rgb::new(0x43, 0xB5, 0x65),
            core_color: None,
            inset: 0.1,
            seed: None,
        }
    }
}

fn check<T>(param: &'static str, value: T, range: RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + Copy + Into<f64>,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            param,
            value: value.into(),
            min: (*range.start()).into(),
            max: (*range.end()).into(),
        })
    }
}

impl NeuronConfig {
    /// Core color, falling back to the base color darkened by 20%.
    pub fn core_color(&self) -> Rgb {
        self.core_color
            .unwrap_or_else(|| self.base_color.lighten(-20.0))
    }

    /// Radius of the inner core circle.
    pub fn core_radius(&self) -> f32 {
        (self.neuron_radius / 2.0).floor()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("neuron_count", self.neuron_count, bounds::NEURON_COUNT)?;
        check("active_ratio", self.active_ratio, bounds::ACTIVE_RATIO)?;
        check(
            "active_light_factor",
            self.active_light_factor,
            bounds::ACTIVE_LIGHT_FACTOR,
        )?;
        check("cycle_spread", self.cycle_spread, bounds::CYCLE_SPREAD)?;
        check("curve_spread", self.curve_spread, bounds::CURVE_SPREAD)?;
        check("neuron_radius", self.neuron_radius, bounds::NEURON_RADIUS)?;
        check("inset", self.inset, bounds::INSET)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: NeuronConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
