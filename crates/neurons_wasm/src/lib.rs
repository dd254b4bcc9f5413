//! Browser binding: a [`NeuronCanvas`] owns a simulation and draws it into a
//! 2D canvas context. The page drives `tick` from its own
//! `requestAnimationFrame` loop.

use std::f64::consts::PI;

use neurons_core::{
    EditOutcome, FpsReadout, NeuronConfig, ParamEdit, Point, Rgb, Simulation, Surface,
    SurfaceSize,
};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[wasm_bindgen]
pub fn init_hooks() {
    console_error_panic_hook::set_once();
}

/// `Surface` backed by a canvas 2D context.
struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas: missing 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("canvas: context is not 2d"))?;
        Ok(CanvasSurface { ctx })
    }
}

#[allow(deprecated)]
impl Surface for CanvasSurface {
    fn clear(&mut self, size: SurfaceSize) {
        self.ctx.clear_rect(0.0, 0.0, size.width as f64, size.height as f64);
    }

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, width: f32, color: Rgb) {
        self.ctx.set_stroke_style(&JsValue::from_str(&color.to_hex()));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.quadratic_curve_to(
            control.x as f64,
            control.y as f64,
            to.x as f64,
            to.y as f64,
        );
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb) {
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_hex()));
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, PI * 2.0);
        self.ctx.fill();
    }
}

fn apply(sim: &mut Simulation, edit: ParamEdit) -> Result<bool, JsValue> {
    sim.apply(edit)
        .map(|outcome| outcome != EditOutcome::Unchanged)
        .map_err(|e| JsValue::from_str(&format!("{} rejected: {}", edit.name(), e)))
}

/// A neuron field bound to one canvas.
///
/// The canvas size is read once at construction; create a new instance
/// after resizing the canvas.
#[wasm_bindgen]
pub struct NeuronCanvas {
    sim: Simulation,
    surface: CanvasSurface,
    readout: FpsReadout,
    fps_text: String,
}

#[wasm_bindgen]
impl NeuronCanvas {
    /// Build a field with default parameters. `seed` makes the layout
    /// reproducible; without it the browser's entropy source is used.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, seed: Option<u32>) -> Result<NeuronCanvas, JsValue> {
        let surface = CanvasSurface::from_canvas(&canvas)?;
        let size = SurfaceSize::new(canvas.width() as f32, canvas.height() as f32);
        let config = NeuronConfig {
            seed: seed.map(u64::from),
            ..Default::default()
        };
        let sim = Simulation::new(config, size)
            .map_err(|e| JsValue::from_str(&format!("Invalid neuron config: {}", e)))?;

        Ok(NeuronCanvas {
            sim,
            surface,
            readout: FpsReadout::default(),
            fps_text: String::new(),
        })
    }

    /// Draw one frame. `now_ms` is the `requestAnimationFrame` timestamp.
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        let report = self.sim.tick(&mut self.surface);
        self.sim.record_frame(now_ms);
        if let Some(text) = self.readout.poll(now_ms, self.sim.fps_meter()) {
            self.fps_text = text;
        }
        report.active
    }

    pub fn fps(&self) -> f64 {
        self.sim.fps()
    }

    /// Readout text, refreshed at most once per second.
    pub fn fps_text(&self) -> String {
        self.fps_text.clone()
    }

    pub fn neuron_count(&self) -> u32 {
        self.sim.generation().len() as u32
    }

    /// Rebuilds the field. Call on slider release, not while dragging.
    pub fn set_neuron_count(&mut self, count: u32) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::NeuronCount(count))
    }

    pub fn set_active_ratio(&mut self, ratio: f32) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::ActiveRatio(ratio))
    }

    pub fn set_active_light_factor(&mut self, factor: f32) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::ActiveLightFactor(factor))
    }

    pub fn set_cycle_spread(&mut self, spread: u32) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::CycleSpread(spread))
    }

    pub fn set_curve_spread(&mut self, spread: u32) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::CurveSpread(spread))
    }

    /// Malformed hex falls back to neutral gray.
    pub fn set_base_color(&mut self, hex: &str) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::base_color_from_str(hex))
    }

    pub fn set_core_color(&mut self, hex: &str) -> Result<bool, JsValue> {
        apply(&mut self.sim, ParamEdit::core_color_from_str(hex))
    }

    pub fn base_color(&self) -> String {
        self.sim.config().base_color.to_hex()
    }

    pub fn core_color(&self) -> String {
        self.sim.config().core_color().to_hex()
    }
}
