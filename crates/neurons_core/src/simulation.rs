use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::NeuronConfig;
use crate::control::{EditOutcome, ParamEdit};
use crate::error::ConfigError;
use crate::fps::FpsMeter;
use crate::geometry::{Bounds, SurfaceSize};
use crate::graph::{Generation, GraphBuilder};
use crate::neuron::{ActivationParams, Neuron, NeuronStyle};
use crate::render::Surface;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub frame: u64,
    /// Neurons that fired on their own cycle
    pub fired: u32,
    /// Somas forced active by a firing neuron
    pub propagated: u32,
    /// Neurons in the Active phase after the tick
    pub active: u32,
    pub links_drawn: u32,
}

/// The neuron field: configuration, current generation, and frame state.
///
/// Single-threaded. A front end calls [`Simulation::tick`] once per display
/// refresh and [`Simulation::apply`] whenever a control is committed.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: NeuronConfig,
    size: SurfaceSize,
    builder: GraphBuilder,
    generation: Generation,
    rng: ChaCha8Rng,
    fps: FpsMeter,
    frame: u64,
    total_fired: u64,
}

impl Simulation {
    /// Validate `config` and build the first generation for a surface of `size`.
    pub fn new(config: NeuronConfig, size: SurfaceSize) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut builder = GraphBuilder::new(Bounds::inset(size, config.inset))
            .with_curve_spread(config.curve_spread)
            .with_cycle_spread(config.cycle_spread);
        let generation = builder.build(config.neuron_count, &mut rng);

        info!(
            neurons = generation.len(),
            width = size.width,
            height = size.height,
            seed = ?config.seed,
            "Neuron field initialized"
        );

        Ok(Simulation {
            config,
            size,
            builder,
            generation,
            rng,
            fps: FpsMeter::default(),
            frame: 0,
            total_fired: 0,
        })
    }

    pub fn config(&self) -> &NeuronConfig {
        &self.config
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Direct access for scripted scenarios (tests, demos).
    pub fn neuron_mut(&mut self, index: u32) -> Option<&mut Neuron> {
        self.generation.neurons_mut().get_mut(index as usize)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn total_fired(&self) -> u64 {
        self.total_fired
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn fps_meter(&self) -> &FpsMeter {
        &self.fps
    }

    /// Feed the FPS estimate; `now_ms` is any monotonic millisecond clock.
    pub fn record_frame(&mut self, now_ms: f64) {
        self.fps.record(now_ms);
    }

    pub fn activation_params(&self) -> ActivationParams {
        ActivationParams {
            active_ratio: self.config.active_ratio,
            active_light_factor: self.config.active_light_factor,
            base_color: self.config.base_color,
        }
    }

    pub fn style(&self) -> NeuronStyle {
        NeuronStyle {
            radius: self.config.neuron_radius,
            core_radius: self.config.core_radius(),
            core_color: self.config.core_color(),
            line_width: 1.0,
        }
    }

    /// Advance one frame: clear, then update and draw every neuron in id order.
    ///
    /// A neuron that fires forces its soma active immediately, so a soma with
    /// a higher id is already Active when its own turn comes in this tick.
    pub fn tick<S>(&mut self, surface: &mut S) -> TickReport
    where
        S: Surface + ?Sized,
    {
        surface.clear(self.size);

        let params = self.activation_params();
        let style = self.style();
        self.frame += 1;
        let mut report = TickReport {
            frame: self.frame,
            ..Default::default()
        };

        let neurons = self.generation.neurons_mut();
        for i in 0..neurons.len() {
            if neurons[i].advance(&params) {
                report.fired += 1;
                if let Some(soma) = neurons[i].soma() {
                    neurons[soma as usize].force_active(params.active_ratio);
                    report.propagated += 1;
                }
            }

            let soma_position = neurons[i].soma().map(|s| neurons[s as usize].position());
            if soma_position.is_some() {
                report.links_drawn += 1;
            }
            neurons[i].render(soma_position, &style, surface);
        }

        report.active = self.generation.active_count() as u32;
        self.total_fired += report.fired as u64;
        report
    }

    /// Replace the generation with a freshly built one of the configured size.
    pub fn rebuild(&mut self) {
        let previous = self.generation.epoch();
        self.generation = self.builder.build(self.config.neuron_count, &mut self.rng);
        info!(
            previous_epoch = previous,
            epoch = self.generation.epoch(),
            neurons = self.generation.len(),
            "Generation rebuilt"
        );
    }

    /// Apply a committed control edit.
    ///
    /// Out-of-bounds edits are rejected and leave the simulation untouched.
    pub fn apply(&mut self, edit: ParamEdit) -> Result<EditOutcome, ConfigError> {
        edit.validate()?;
        if !edit.differs_from(&self.config) {
            debug!(%edit, "Parameter unchanged");
            return Ok(EditOutcome::Unchanged);
        }
        self.config = edit.write_into(self.config.clone());

        let outcome = match edit {
            ParamEdit::NeuronCount(_) => {
                self.rebuild();
                EditOutcome::Rebuilt
            }
            ParamEdit::CycleSpread(spread) => {
                self.builder.set_cycle_spread(spread);
                self.generation.reroll_cycles(spread, &mut self.rng);
                EditOutcome::Recomputed
            }
            ParamEdit::CurveSpread(spread) => {
                self.builder.set_curve_spread(spread);
                self.generation.reroll_curves(spread, &mut self.rng);
                EditOutcome::Recomputed
            }
            ParamEdit::ActiveRatio(_)
            | ParamEdit::ActiveLightFactor(_)
            | ParamEdit::BaseColor(_)
            | ParamEdit::CoreColor(_) => EditOutcome::Live,
        };

        info!(%edit, ?outcome, "Parameter applied");
        Ok(outcome)
    }
}
