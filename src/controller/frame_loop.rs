use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::{HtmlCanvasElement, Window};

use crate::controller::{InputProcessor, InputState};
use crate::model::{GameScene, SpriteCatalog};
use crate::ui;
use crate::view::layout::fit_canvas;
use crate::view::render::{sprite_instances, RenderState};

/// Main game loop state and update logic
pub struct FrameLoopContext {
    pub scene: Rc<RefCell<GameScene>>,
    pub input_state: Rc<RefCell<InputState>>,
    pub input_processor: InputProcessor,
    pub sprites: SpriteCatalog,
    pub canvas: HtmlCanvasElement,
    pub egui_ctx: egui::Context,
    pub last_time: f64,
}

impl FrameLoopContext {
    /// Advance the scene by the time since the previous frame and prepare
    /// everything `RenderState::draw_frame` needs.
    pub fn update(&mut self, window: &Window, render_state: &mut RenderState) {
        let now = window.performance().map(|p| p.now()).unwrap_or_else(js_sys::Date::now);
        let dt_ms = (now - self.last_time).max(0.0);
        self.last_time = now;

        let sample = self.input_processor.sample(&self.input_state.borrow());
        self.scene.borrow_mut().update(dt_ms, &sample);

        let scene = self.scene.borrow();
        render_state.instances = sprite_instances(&scene, &self.sprites);

        // Scale egui with the canvas so the overlay keeps its on-screen size
        let css_width = self.canvas.get_bounding_client_rect().width();
        let ppp = if css_width > 0.0 {
            (render_state.width as f64 / css_width) as f32
        } else {
            1.0
        };
        self.egui_ctx.set_pixels_per_point(ppp);
        let raw_input = ui::raw_input(render_state.width, render_state.height, ppp, now);
        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &scene, (dt_ms / 1000.0) as f32);

        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), ppp);
        render_state.egui_primitives = Some(primitives);
        render_state.egui_full_output = Some(full_output);
        render_state.egui_dpr = ppp;
    }
}

/// Letterbox the fixed-size canvas into the current window. Only the CSS
/// size changes; the drawing buffer keeps its logical resolution.
pub fn fit_to_window(window: &Window, canvas: &HtmlCanvasElement) -> Result<(f64, f64), JsValue> {
    let ww = window.inner_width()?.as_f64().unwrap_or(0.0);
    let wh = window.inner_height()?.as_f64().unwrap_or(0.0);
    let (w, h) = fit_canvas(ww, wh, canvas.width() as f64, canvas.height() as f64);

    let style = canvas.style();
    style.set_property("width", &format!("{w}px"))?;
    style.set_property("height", &format!("{h}px"))?;
    tracing::debug!(width = w, height = h, "canvas fitted to window");
    Ok((w, h))
}
