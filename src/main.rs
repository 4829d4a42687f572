use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

// Import from the library crate
use reef_dash::{
    config::Level,
    controller::{InputEvent, InputProcessor, InputState},
    logging,
    model::{Assets, GameScene, SpriteCatalog},
    ui,
    view::{render::sprite_instances, GpuContext, RenderState},
};

/// Level file to load instead of the built-in one
const LEVEL_ENV: &str = "REEF_DASH_LEVEL";

struct App {
    gpu: GpuContext,
    window: Arc<Window>,
    render_state: RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Game state
    scene: GameScene,
    sprites: SpriteCatalog,
    input_state: InputState,
    input_processor: InputProcessor,

    /// Cursor position in canvas coordinates
    cursor_y: f32,
    last_frame_time: Instant,
}

/// Key names as the browser reports them, for the keys the game reads
fn key_name(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::ArrowUp => Some("ArrowUp"),
        KeyCode::ArrowDown => Some("ArrowDown"),
        _ => None,
    }
}

fn load_level() -> Result<Level, reef_dash::error::ConfigError> {
    match std::env::var(LEVEL_ENV) {
        Ok(path) => {
            tracing::info!(%path, "loading level file");
            Level::load(path)
        }
        Err(_) => Level::builtin(),
    }
}

impl App {
    async fn new(window: Arc<Window>, assets: Assets, level: Level) -> Result<Self, String> {
        let size = window.inner_size();
        let scene = GameScene::create(&assets, &level).map_err(|e| e.to_string())?;

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height)
            .await
            .map_err(|e| format!("GPU init failed: {e}"))?;

        let render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.queue.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
            (level.config.canvas_width as f32, level.config.canvas_height as f32),
            assets.sprites.tint("background"),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Ok(Self {
            gpu,
            window,
            render_state,
            egui_state,
            egui_ctx,
            cursor_y: level.config.canvas_height as f32 / 2.0,
            scene,
            sprites: assets.sprites,
            input_state: InputState::new(),
            input_processor: InputProcessor::default(),
            last_frame_time: Instant::now(),
        })
    }

    /// Translate a window event into game input. Returns true when handled.
    /// egui may swallow presses, but releases and moves always reach the
    /// game so a drag that ends over the overlay still lets go.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        let game_event = match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key: PhysicalKey::Code(code), .. }, .. } => {
                key_name(*code).map(|key| match state {
                    ElementState::Pressed => InputEvent::KeyDown(key.to_string()),
                    ElementState::Released => InputEvent::KeyUp(key.to_string()),
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (_, y) = self.render_state.surface_to_canvas(position.x as f32, position.y as f32);
                self.cursor_y = y;
                Some(InputEvent::PointerMove { y })
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => Some(match state {
                ElementState::Pressed => InputEvent::PointerDown { y: self.cursor_y },
                ElementState::Released => InputEvent::PointerUp { y: self.cursor_y },
            }),
            WindowEvent::Touch(Touch { phase, location, .. }) => {
                let (_, y) = self.render_state.surface_to_canvas(location.x as f32, location.y as f32);
                Some(match phase {
                    TouchPhase::Started => InputEvent::PointerDown { y },
                    TouchPhase::Moved => InputEvent::PointerMove { y },
                    TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::PointerUp { y },
                })
            }
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            WindowEvent::Occluded(occluded) => Some(InputEvent::VisibilityChanged { visible: !occluded }),
            _ => None,
        };

        match game_event {
            Some(e) if !(egui_captured && e.is_press()) => {
                self.input_state.process_event(&e);
                true
            }
            _ => egui_captured,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.render_state
            .resize(self.gpu.device.as_ref(), &self.gpu.surface, new_size.width, new_size.height);
    }

    fn update(&mut self, dt: f32) {
        let sample = self.input_processor.sample(&self.input_state);
        self.scene.update(dt as f64 * 1000.0, &sample);
        self.render_state.instances = sprite_instances(&self.scene, &self.sprites);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &self.scene, dt);
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        let ppp = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), ppp);
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_full_output = Some(full_output);
        self.render_state.egui_dpr = ppp;
    }

    fn render(&mut self) {
        self.render_state
            .draw_frame(self.gpu.device.as_ref(), self.gpu.queue.as_ref(), &self.gpu.surface);
    }
}

fn main() -> ExitCode {
    logging::init();

    let (assets, level) = match Assets::preload().and_then(|assets| Ok((assets, load_level()?))) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(error = %e, "failed to load game data");
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!(error = %e, "failed to create event loop");
            return ExitCode::FAILURE;
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title("Reef Dash")
        .with_inner_size(winit::dpi::LogicalSize::new(
            level.config.canvas_width / 2,
            level.config.canvas_height / 2,
        ));
    let window = match event_loop.create_window(window_attributes) {
        Ok(window) => Arc::new(window),
        Err(e) => {
            tracing::error!(error = %e, "failed to create window");
            return ExitCode::FAILURE;
        }
    };

    let mut app = match pollster::block_on(App::new(window, assets, level)) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("scene started");

    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32();
                            app.last_frame_time = now;

                            app.update(dt);
                            app.render();
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "event loop failed");
            ExitCode::FAILURE
        }
    }
}
