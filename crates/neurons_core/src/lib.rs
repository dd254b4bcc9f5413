//! Neuron field core.
//!
//! Point "neurons" are scattered over a drawing surface, each linked to one
//! neighbor (its soma) by a curved line. Every neuron pulses on its own cycle;
//! when it fires it drags its soma into the Active phase with it.
//!
//! - [`graph`]: placement and ordering-dependent soma assignment
//! - [`neuron`]: the Inactive/Active state machine and per-neuron drawing
//! - [`simulation`]: the per-frame entry point and parameter edits
//! - [`render`]: the surface abstraction hosts implement
//! - [`scheduler`]: frame pacing for hosts without a refresh loop

pub mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod fps;
pub mod geometry;
pub mod graph;
pub mod neuron;
pub mod render;
pub mod scheduler;
pub mod simulation;

pub use color::{lighten, Rgb};
pub use config::NeuronConfig;
pub use control::{CountDebouncer, EditOutcome, ParamEdit};
pub use error::{ColorError, ConfigError};
pub use fps::{FpsMeter, FpsReadout};
pub use geometry::{Bounds, Point, SurfaceSize};
pub use graph::{Generation, GraphBuilder, NeuronHandle};
pub use neuron::{ActivationState, Neuron};
pub use render::{DrawCommand, RecordingSurface, Surface};
pub use scheduler::{FixedRateScheduler, FrameScheduler, SteppedClock};
pub use simulation::{Simulation, TickReport};
