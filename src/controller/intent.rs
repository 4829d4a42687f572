use serde::Deserialize;

use super::input::InputSample;

/// Direction the player wants to swim this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    Up,
    Down,
    /// No direction; the player holds still
    #[default]
    Idle,
}

/// Which input source is evaluated last and therefore wins when both
/// produce a result in the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPriority {
    #[default]
    KeyboardOverPointer,
    PointerOverKeyboard,
}

/// Turns sampled pointer/keyboard state into an [`Intent`].
///
/// Each source has a latch: while a pointer drag or key press owns the
/// intent it keeps producing it, and on release the latch clears the
/// intent exactly once. A source that was never engaged leaves the previous
/// intent untouched.
#[derive(Debug, Clone)]
pub struct InputResolver {
    pub dead_band: f32,
    pub priority: InputPriority,
    pointer_latched: bool,
    key_latched: bool,
}

impl InputResolver {
    pub fn new(dead_band: f32, priority: InputPriority) -> Self {
        Self {
            dead_band,
            priority,
            pointer_latched: false,
            key_latched: false,
        }
    }

    pub fn pointer_latched(&self) -> bool {
        self.pointer_latched
    }

    pub fn key_latched(&self) -> bool {
        self.key_latched
    }

    /// Resolve this tick's intent, starting from the intent carried over
    /// from the previous tick.
    pub fn resolve(&mut self, sample: &InputSample, current: Intent) -> Intent {
        match self.priority {
            InputPriority::KeyboardOverPointer => {
                let intent = self.resolve_pointer(sample, current);
                self.resolve_keys(sample, intent)
            }
            InputPriority::PointerOverKeyboard => {
                let intent = self.resolve_keys(sample, current);
                self.resolve_pointer(sample, intent)
            }
        }
    }

    fn resolve_pointer(&mut self, sample: &InputSample, current: Intent) -> Intent {
        if sample.pointer_down {
            self.pointer_latched = true;
            // screen y grows downward, so dragging up gives a positive dy
            let dy = sample.pointer_down_y - sample.pointer_y;
            if dy > self.dead_band {
                Intent::Up
            } else if -dy > self.dead_band {
                Intent::Down
            } else {
                Intent::Idle
            }
        } else if self.pointer_latched {
            self.pointer_latched = false;
            Intent::Idle
        } else {
            current
        }
    }

    fn resolve_keys(&mut self, sample: &InputSample, current: Intent) -> Intent {
        if sample.down_pressed {
            self.key_latched = true;
            Intent::Down
        } else if sample.up_pressed {
            self.key_latched = true;
            Intent::Up
        } else if self.key_latched {
            self.key_latched = false;
            Intent::Idle
        } else {
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(down_y: f32, y: f32) -> InputSample {
        InputSample {
            pointer_down: true,
            pointer_y: y,
            pointer_down_y: down_y,
            ..Default::default()
        }
    }

    fn released() -> InputSample {
        InputSample::default()
    }

    #[test]
    fn test_swipe_up_beyond_dead_band() {
        let mut r = InputResolver::new(10.0, InputPriority::default());
        assert_eq!(r.resolve(&pointer(500.0, 485.0), Intent::Idle), Intent::Up);
        assert!(r.pointer_latched());
    }

    #[test]
    fn test_swipe_down_beyond_dead_band() {
        let mut r = InputResolver::new(10.0, InputPriority::default());
        assert_eq!(r.resolve(&pointer(500.0, 511.0), Intent::Idle), Intent::Down);
    }

    #[test]
    fn test_dead_band_is_idle_inclusive() {
        let mut r = InputResolver::new(10.0, InputPriority::default());
        for d in [-10.0, -5.0, 0.0, 5.0, 10.0] {
            assert_eq!(
                r.resolve(&pointer(500.0, 500.0 + d), Intent::Up),
                Intent::Idle,
                "delta {d} is inside the dead band"
            );
        }
        assert_eq!(r.resolve(&pointer(500.0, 505.0), Intent::Down), Intent::Idle);
    }

    #[test]
    fn test_release_clears_once() {
        let mut r = InputResolver::new(10.0, InputPriority::default());
        r.resolve(&pointer(500.0, 400.0), Intent::Idle);
        assert_eq!(r.resolve(&released(), Intent::Up), Intent::Idle);
        assert!(!r.pointer_latched());
        // nothing engaged: previous intent carries over
        assert_eq!(r.resolve(&released(), Intent::Down), Intent::Down);
    }

    #[test]
    fn test_held_key_keeps_intent() {
        let mut r = InputResolver::new(10.0, InputPriority::default());
        let held = InputSample { up_pressed: true, ..Default::default() };
        for _ in 0..3 {
            assert_eq!(r.resolve(&held, Intent::Idle), Intent::Up);
        }
        assert!(r.key_latched());
        assert_eq!(r.resolve(&released(), Intent::Up), Intent::Idle);
        assert!(!r.key_latched());
    }

    #[test]
    fn test_down_key_beats_up_key() {
        let mut r = InputResolver::new(10.0, InputPriority::default());
        let both = InputSample { up_pressed: true, down_pressed: true, ..Default::default() };
        assert_eq!(r.resolve(&both, Intent::Idle), Intent::Down);
    }

    #[test]
    fn test_keyboard_over_pointer() {
        let mut r = InputResolver::new(10.0, InputPriority::KeyboardOverPointer);
        let sample = InputSample { down_pressed: true, ..pointer(500.0, 400.0) };
        assert_eq!(r.resolve(&sample, Intent::Idle), Intent::Down);
    }

    #[test]
    fn test_key_release_overrides_swipe_under_keyboard_priority() {
        let mut r = InputResolver::new(10.0, InputPriority::KeyboardOverPointer);
        r.resolve(&InputSample { down_pressed: true, ..Default::default() }, Intent::Idle);
        assert_eq!(r.resolve(&pointer(500.0, 400.0), Intent::Down), Intent::Idle);
        assert_eq!(r.resolve(&pointer(500.0, 400.0), Intent::Idle), Intent::Up);
    }

    #[test]
    fn test_pointer_over_keyboard() {
        let mut r = InputResolver::new(10.0, InputPriority::PointerOverKeyboard);
        let sample = InputSample { down_pressed: true, ..pointer(500.0, 400.0) };
        assert_eq!(r.resolve(&sample, Intent::Idle), Intent::Up);

        // a tap inside the dead band also wins over the key
        let tap = InputSample { down_pressed: true, ..pointer(500.0, 502.0) };
        assert_eq!(r.resolve(&tap, Intent::Down), Intent::Idle);
    }
}
