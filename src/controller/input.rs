/// Platform-agnostic input handling
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Pointer events (mouse or touch), y in canvas pixels
    PointerDown { y: f32 },
    PointerMove { y: f32 },
    PointerUp { y: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

impl InputEvent {
    /// Presses start a gesture; a UI overlay may claim them. Everything else
    /// has to reach the game state so held input is always released.
    pub fn is_press(&self) -> bool {
        matches!(self, InputEvent::KeyDown(_) | InputEvent::PointerDown { .. })
    }
}

/// Raw pointer and keyboard state, updated from events between frames
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub pointer_down: bool,
    pub pointer_y: f32,
    /// Where the current (or last) press started
    pub pointer_down_y: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            pointer_down: false,
            pointer_y: 0.0,
            pointer_down_y: 0.0,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::PointerDown { y } => {
                self.pointer_down = true;
                self.pointer_y = *y;
                self.pointer_down_y = *y;
            }
            InputEvent::PointerMove { y } => {
                self.pointer_y = *y;
            }
            InputEvent::PointerUp { y } => {
                self.pointer_down = false;
                self.pointer_y = *y;
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { visible: false } => {
                self.clear();
            }
            InputEvent::VisibilityChanged { visible: true } => {}
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Drop held keys and any active press (focus loss, tab switch)
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.pointer_down = false;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// One frame's worth of input, as consumed by the intent resolver
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    pub pointer_down: bool,
    pub pointer_y: f32,
    pub pointer_down_y: f32,
    pub up_pressed: bool,
    pub down_pressed: bool,
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub up: String,
    pub down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "ArrowUp".to_string(),
            down: "ArrowDown".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn is_moving_up(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.up)
    }

    pub fn is_moving_down(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.down)
    }

    /// Keys the page should not scroll on
    pub fn is_game_key(&self, key: &str) -> bool {
        key == self.bindings.up || key == self.bindings.down
    }

    pub fn sample(&self, input: &InputState) -> InputSample {
        InputSample {
            pointer_down: input.pointer_down,
            pointer_y: input.pointer_y,
            pointer_down_y: input.pointer_down_y,
            up_pressed: self.is_moving_up(input),
            down_pressed: self.is_moving_down(input),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    /// Map a pointer event's client y into logical canvas pixels, since the
    /// canvas is stretched by CSS to fit the window.
    pub fn canvas_y(e: &PointerEvent, canvas: &HtmlCanvasElement) -> f32 {
        let rect = canvas.get_bounding_client_rect();
        let (_, y) = crate::view::layout::css_to_canvas(
            (e.client_x() as f64 - rect.left(), e.client_y() as f64 - rect.top()),
            (rect.width(), rect.height()),
            (canvas.width() as f64, canvas.height() as f64),
        );
        y as f32
    }

    pub fn pointer_event_to_input(e: &PointerEvent, canvas: &HtmlCanvasElement, kind: &str) -> Option<InputEvent> {
        let y = canvas_y(e, canvas);
        match kind {
            "pointerdown" => Some(InputEvent::PointerDown { y }),
            "pointermove" => Some(InputEvent::PointerMove { y }),
            "pointerup" | "pointercancel" => Some(InputEvent::PointerUp { y }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_press_records_origin() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDown { y: 500.0 });
        input.process_event(&InputEvent::PointerMove { y: 485.0 });
        let sample = InputProcessor::default().sample(&input);
        assert!(sample.pointer_down);
        assert_eq!(sample.pointer_down_y, 500.0);
        assert_eq!(sample.pointer_y, 485.0);

        input.process_event(&InputEvent::PointerUp { y: 480.0 });
        assert!(!input.pointer_down);
    }

    #[test]
    fn test_cursor_keys_sampled() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("ArrowDown".into()));
        input.process_event(&InputEvent::KeyDown("w".into()));
        let sample = InputProcessor::default().sample(&input);
        assert!(sample.down_pressed);
        assert!(!sample.up_pressed, "only cursor keys are bound by default");

        input.process_event(&InputEvent::KeyUp("ArrowDown".into()));
        assert!(!InputProcessor::default().sample(&input).down_pressed);
    }

    #[test]
    fn test_focus_loss_releases_everything() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        input.process_event(&InputEvent::PointerDown { y: 10.0 });
        input.process_event(&InputEvent::FocusLost);
        let sample = InputProcessor::default().sample(&input);
        assert!(!sample.pointer_down && !sample.up_pressed);
    }

    #[test]
    fn test_only_hiding_clears_input() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        input.process_event(&InputEvent::PointerDown { y: 10.0 });
        input.process_event(&InputEvent::VisibilityChanged { visible: true });
        assert!(input.pointer_down && input.is_key_pressed("ArrowUp"));

        input.process_event(&InputEvent::VisibilityChanged { visible: false });
        assert!(!input.pointer_down && !input.is_key_pressed("ArrowUp"));
    }

    #[test]
    fn test_releases_are_never_suppressible() {
        assert!(InputEvent::KeyDown("ArrowUp".into()).is_press());
        assert!(InputEvent::PointerDown { y: 0.0 }.is_press());
        for event in [
            InputEvent::KeyUp("ArrowUp".into()),
            InputEvent::PointerMove { y: 0.0 },
            InputEvent::PointerUp { y: 0.0 },
            InputEvent::FocusLost,
            InputEvent::VisibilityChanged { visible: false },
        ] {
            assert!(!event.is_press(), "{event:?} must reach the input state");
        }
    }

    #[test]
    fn test_custom_bindings() {
        let processor = InputProcessor::new(KeyBindings { up: "w".into(), down: "s".into() });
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".into()));
        assert!(processor.sample(&input).up_pressed);
        assert!(processor.is_game_key("s"));
        assert!(!processor.is_game_key("ArrowUp"));
    }
}
