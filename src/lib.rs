// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
use {
    std::cell::RefCell,
    std::rc::Rc,
    wasm_bindgen::closure::Closure,
    wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue},
    web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, PointerEvent, Window},
};

#[cfg(target_arch = "wasm32")]
use {
    config::Level,
    controller::frame_loop::fit_to_window,
    controller::input::wasm::{keyboard_event_to_input, pointer_event_to_input},
    controller::{FrameLoopContext, InputEvent, InputProcessor, InputState},
    model::{Assets, GameScene},
    view::{GpuContext, RenderState},
};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();

    let assets = Assets::preload().map_err(|e| js_error(e.to_string()))?;
    let level = Level::builtin().map_err(|e| js_error(e.to_string()))?;
    let (window, document, canvas) = init_canvas(level.config.canvas_width, level.config.canvas_height)?;
    setup_app(&window, &document, &canvas, assets, level).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    assets: Assets,
    level: Level,
) -> Result<(), JsValue> {
    let scene = GameScene::create(&assets, &level).map_err(|e| js_error(e.to_string()))?;
    let (canvas_w, canvas_h) = (level.config.canvas_width, level.config.canvas_height);

    let gpu = GpuContext::new(canvas, canvas_w, canvas_h)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e:?}")))?;

    let mut render_state = RenderState::new(
        gpu.device.as_ref(),
        gpu.queue.as_ref(),
        gpu.format,
        gpu.config.alpha_mode,
        gpu.config.width,
        gpu.config.height,
        (canvas_w as f32, canvas_h as f32),
        assets.sprites.tint("background"),
    );

    let scene = Rc::new(RefCell::new(scene));
    let input_state = Rc::new(RefCell::new(InputState::new()));
    let input_processor = InputProcessor::default();

    fit_to_window(window, canvas)?;
    setup_input_listeners(document, window, canvas, input_state.clone(), &input_processor)?;

    let mut frame_ctx = FrameLoopContext {
        scene,
        input_state,
        input_processor,
        sprites: assets.sprites.clone(),
        canvas: canvas.clone(),
        egui_ctx: egui::Context::default(),
        last_time: window.performance().map(|p| p.now()).unwrap_or_else(js_sys::Date::now),
    };
    tracing::info!(width = canvas_w, height = canvas_h, "scene started");

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window_for_loop = window.clone();

        move || {
            frame_ctx.update(&window_for_loop, &mut render_state);
            render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface);
        }
    });
    f.start()
}

/// Forward DOM events into the shared `InputState`
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    input_state: Rc<RefCell<InputState>>,
    input_processor: &InputProcessor,
) -> Result<(), JsValue> {
    // Swipes must not scroll or zoom the page
    canvas.style().set_property("touch-action", "none")?;

    // Pointer down/move/up/cancel
    for kind in ["pointerdown", "pointermove", "pointerup", "pointercancel"] {
        let input_state = input_state.clone();
        let canvas_for_event = canvas.clone();
        let listener = Closure::wrap(Box::new(move |e: PointerEvent| {
            if kind == "pointerdown" {
                // keep receiving moves after the finger leaves the canvas
                let _ = canvas_for_event.set_pointer_capture(e.pointer_id());
            }
            if let Some(event) = pointer_event_to_input(&e, &canvas_for_event, kind) {
                input_state.borrow_mut().process_event(&event);
            }
            e.prevent_default();
        }) as Box<dyn FnMut(PointerEvent)>);
        canvas.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        listener.forget();
    }

    // Keyboard down
    {
        let input_state = input_state.clone();
        let input_processor = input_processor.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            if input_processor.is_game_key(&e.key()) {
                e.prevent_default();
            }
            input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, true));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - release keys and pointer
    {
        let input_state = input_state.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change
    {
        let input_state = input_state.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            let visible = !doc.hidden();
            input_state.borrow_mut().process_event(&InputEvent::VisibilityChanged { visible });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Window resize - letterbox the canvas again
    {
        let window_for_resize = window.clone();
        let canvas_for_resize = canvas.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            if let Err(e) = fit_to_window(&window_for_resize, &canvas_for_resize) {
                tracing::warn!("resize failed: {e:?}");
            }
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Schedule the next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
        Ok(())
    }
}
