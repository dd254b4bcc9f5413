//! Drawing surface abstraction.
//!
//! The simulation only needs three primitives. Hosts implement [`Surface`]
//! directly (canvas) or record commands and replay them later (Bevy).

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::geometry::{Point, SurfaceSize};

/// A 2D drawing target
pub trait Surface {
    /// Clear the whole drawing region.
    fn clear(&mut self, size: SurfaceSize);

    /// Stroke a quadratic curve from `from` to `to` bowed towards `control`.
    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, width: f32, color: Rgb);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb);
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(SurfaceSize),
    Curve {
        from: Point,
        control: Point,
        to: Point,
        width: f32,
        color: Rgb,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Rgb,
    },
}

/// Surface that keeps the commands of the current frame.
///
/// `clear` drops everything recorded so far, so after a tick the buffer holds
/// exactly one frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn curves(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Curve { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, size: SurfaceSize) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(size));
    }

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, width: f32, color: Rgb) {
        self.commands.push(DrawCommand::Curve {
            from,
            control,
            to,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }
}
