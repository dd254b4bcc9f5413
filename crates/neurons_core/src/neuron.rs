use core::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::geometry::Point;
use crate::render::Surface;

/// Activation phase of a neuron
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationState {
    /// Counting up towards the cycle period, drawn in the base color
    #[default]
    Inactive,
    /// Counting down after firing, drawn lighter the closer it is to firing
    Active,
}

/// Per-tick parameters shared by every neuron of a generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivationParams {
    pub active_ratio: f32,
    pub active_light_factor: f32,
    pub base_color: Rgb,
}

/// Fixed drawing attributes shared by every neuron of a generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeuronStyle {
    pub radius: f32,
    pub core_radius: f32,
    pub core_color: Rgb,
    pub line_width: f32,
}

/// A point entity pulsing on its own cycle, linked to at most one soma.
///
/// The soma is stored as an index into the owning generation, so a neuron
/// never holds a reference that could outlive its generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Neuron {
    id: u32,
    position: Point,
    curve_offset: Point,
    soma: Option<u32>,
    cycle_period: u32,
    cycle_counter: f32,
    state: ActivationState,
    display_color: Rgb,
}

impl Neuron {
    pub fn new(id: u32, position: Point, curve_offset: Point, cycle_period: u32) -> Self {
        Neuron {
            id,
            position,
            curve_offset,
            soma: None,
            cycle_period: cycle_period.max(1),
            cycle_counter: 0.0,
            state: ActivationState::Inactive,
            display_color: Rgb::NEUTRAL,
        }
    }

    /// Start from an arbitrary point of the cycle.
    pub fn with_cycle_state(mut self, state: ActivationState, counter: f32) -> Self {
        self.state = state;
        self.cycle_counter = counter;
        self
    }

    pub fn set_cycle_state(&mut self, state: ActivationState, counter: f32) {
        self.state = state;
        self.cycle_counter = counter;
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn curve_offset(&self) -> Point {
        self.curve_offset
    }

    pub fn soma(&self) -> Option<u32> {
        self.soma
    }

    pub fn cycle_period(&self) -> u32 {
        self.cycle_period
    }

    pub fn cycle_counter(&self) -> f32 {
        self.cycle_counter
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }

    /// Color chosen by the most recent [`Neuron::advance`].
    pub fn display_color(&self) -> Rgb {
        self.display_color
    }

    pub(crate) fn set_soma(&mut self, soma: Option<u32>) {
        debug_assert_ne!(soma, Some(self.id), "neuron {} linked to itself", self.id);
        self.soma = soma.filter(|&target| target != self.id);
    }

    pub(crate) fn set_curve_offset(&mut self, offset: Point) {
        self.curve_offset = offset;
    }

    pub(crate) fn set_cycle_period(&mut self, period: u32) {
        self.cycle_period = period.max(1);
    }

    /// Enter the Active phase with the counter reset to `period / ratio`.
    ///
    /// Used both when the neuron fires on its own and when an upstream
    /// neuron fires into it; the previous counter is discarded either way.
    pub fn force_active(&mut self, active_ratio: f32) {
        self.state = ActivationState::Active;
        self.cycle_counter = self.cycle_period as f32 / active_ratio;
    }

    /// Advance one frame. Returns `true` when the neuron fired this frame,
    /// in which case the caller must propagate into the soma.
    pub fn advance(&mut self, params: &ActivationParams) -> bool {
        self.display_color = params.base_color;

        match self.state {
            ActivationState::Inactive => {
                self.cycle_counter += 1.0;
                if self.cycle_counter >= self.cycle_period as f32 {
                    self.force_active(params.active_ratio);
                    return true;
                }
            }
            ActivationState::Active => {
                self.cycle_counter -= 1.0;
                // A fractional counter can dip below zero here, so the final
                // Active frame may be a shade darker than the base color.
                let progress = self.cycle_counter as f64 / self.cycle_period as f64;
                self.display_color = params
                    .base_color
                    .lighten(params.active_light_factor as f64 * progress);
                if self.cycle_counter <= 0.0 {
                    self.state = ActivationState::Inactive;
                    self.cycle_counter = 0.0;
                }
            }
        }
        false
    }

    /// Draw the link to the soma (if any), then the body and its core.
    pub fn render<S>(&self, soma_position: Option<Point>, style: &NeuronStyle, surface: &mut S)
    where
        S: Surface + ?Sized,
    {
        if let Some(target) = soma_position {
            surface.stroke_quadratic(
                self.position,
                self.position.offset(self.curve_offset),
                target,
                style.line_width,
                self.display_color,
            );
        }
        surface.fill_circle(self.position, style.radius, self.display_color);
        surface.fill_circle(self.position, style.core_radius, style.core_color);
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Neuron[{} @({:.0},{:.0}) soma={:?} {:?} {:.1}/{}]",
            self.id,
            self.position.x,
            self.position.y,
            self.soma,
            self.state,
            self.cycle_counter,
            self.cycle_period
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};

    fn params() -> ActivationParams {
        ActivationParams {
            active_ratio: 3.0,
            active_light_factor: 80.0,
            base_color: Rgb::new(0x43, 0xB5, 0x65),
        }
    }

    #[test]
    fn test_fires_at_period() {
        let mut n = Neuron::new(0, Point::default(), Point::default(), 60)
            .with_cycle_state(ActivationState::Inactive, 59.0);
        assert!(n.advance(&params()));
        assert_eq!(n.state(), ActivationState::Active);
        assert_eq!(n.cycle_counter(), 20.0);
        // The firing frame is still drawn in the base color
        assert_eq!(n.display_color(), params().base_color);
    }

    #[test]
    fn test_inactive_counts_up() {
        let mut n = Neuron::new(0, Point::default(), Point::default(), 60);
        for expected in 1..60 {
            assert!(!n.advance(&params()));
            assert_eq!(n.cycle_counter(), expected as f32);
            assert!(n.cycle_counter() >= 0.0);
        }
    }

    #[test]
    fn test_active_fades_and_returns() {
        let mut n = Neuron::new(0, Point::default(), Point::default(), 90)
            .with_cycle_state(ActivationState::Active, 30.0);
        assert!(!n.advance(&params()));
        // 80 * 29 / 90 = 25.77..% -> round(2.55 * 25.77) = 66
        assert_eq!(n.display_color(), params().base_color.lighten(80.0 * 29.0 / 90.0));
        for _ in 0..29 {
            n.advance(&params());
        }
        assert_eq!(n.state(), ActivationState::Inactive);
        assert_eq!(n.cycle_counter(), 0.0);
        assert_eq!(n.display_color(), params().base_color);
    }

    #[test]
    fn test_fractional_counter_resets_to_zero() {
        // 100 / 3 leaves a fractional remainder that must not go negative
        let mut n = Neuron::new(0, Point::default(), Point::default(), 100);
        n.force_active(3.0);
        for _ in 0..40 {
            n.advance(&params());
            assert!(n.cycle_counter() >= 0.0);
        }
        assert_eq!(n.state(), ActivationState::Inactive);
    }

    #[test]
    fn test_force_active_discards_counter() {
        let mut n = Neuron::new(0, Point::default(), Point::default(), 120)
            .with_cycle_state(ActivationState::Active, 3.0);
        n.force_active(3.0);
        assert_eq!(n.cycle_counter(), 40.0);
        assert!(n.cycle_counter() <= n.cycle_period() as f32);
    }

    #[test]
    fn test_render_order() {
        let style = NeuronStyle {
            radius: 5.0,
            core_radius: 2.0,
            core_color: Rgb::new(1, 2, 3),
            line_width: 1.0,
        };
        let mut n = Neuron::new(0, Point::new(10.0, 10.0), Point::new(-4.0, 3.0), 60);
        n.advance(&params());

        let mut surface = RecordingSurface::default();
        n.render(Some(Point::new(20.0, 20.0)), &style, &mut surface);
        assert_eq!(surface.commands().len(), 3);
        match surface.commands()[0] {
            DrawCommand::Curve { control, to, .. } => {
                assert_eq!(control, Point::new(6.0, 13.0));
                assert_eq!(to, Point::new(20.0, 20.0));
            }
            ref other => panic!("expected curve, got {:?}", other),
        }
        assert!(matches!(
            surface.commands()[2],
            DrawCommand::Circle { radius, color, .. } if radius == 2.0 && color == style.core_color
        ));

        let mut lone = RecordingSurface::default();
        n.render(None, &style, &mut lone);
        assert_eq!(lone.commands().len(), 2);
    }
}
