use super::intent::Intent;

/// Vertical limits for the player's centre so the sprite stays on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBounds {
    pub upper: f32,
    pub lower: f32,
}

impl MotionBounds {
    /// `player_height` is the unscaled sprite height
    pub fn new(player_height: f32, player_scale: f32, canvas_height: f32) -> Self {
        let upper = player_height * player_scale / 2.0;
        Self {
            upper,
            lower: canvas_height - upper,
        }
    }
}

/// What to do with the player body this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocityCommand {
    /// Set vertical velocity only
    Vertical(f32),
    /// Zero velocity on both axes
    Stop,
}

/// Translates intent into a velocity command
#[derive(Debug, Clone, Copy)]
pub struct MotionController {
    pub speed: f32,
}

impl MotionController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Returns the command and the intent to carry into the next tick.
    pub fn command(&self, intent: Intent, y: f32, bounds: &MotionBounds) -> (VelocityCommand, Intent) {
        match intent {
            Intent::Down if y < bounds.lower => (VelocityCommand::Vertical(self.speed), intent),
            Intent::Up if y > bounds.upper => (VelocityCommand::Vertical(-self.speed), intent),
            _ => (VelocityCommand::Stop, Intent::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> MotionBounds {
        MotionBounds::new(200.0, 0.5, 1080.0)
    }

    #[test]
    fn test_bounds_from_sprite() {
        assert_eq!(bounds(), MotionBounds { upper: 50.0, lower: 1030.0 });
    }

    #[test]
    fn test_up_inside_bounds() {
        let m = MotionController::new(25.0);
        assert_eq!(m.command(Intent::Up, 540.0, &bounds()), (VelocityCommand::Vertical(-25.0), Intent::Up));
    }

    #[test]
    fn test_down_inside_bounds() {
        let m = MotionController::new(25.0);
        assert_eq!(m.command(Intent::Down, 540.0, &bounds()), (VelocityCommand::Vertical(25.0), Intent::Down));
    }

    #[test]
    fn test_idle_stops() {
        let m = MotionController::new(25.0);
        assert_eq!(m.command(Intent::Idle, 540.0, &bounds()), (VelocityCommand::Stop, Intent::Idle));
    }

    #[test]
    fn test_bound_reached_stops_and_clears() {
        let m = MotionController::new(25.0);
        let b = bounds();
        assert_eq!(m.command(Intent::Up, b.upper, &b), (VelocityCommand::Stop, Intent::Idle));
        assert_eq!(m.command(Intent::Down, b.lower, &b), (VelocityCommand::Stop, Intent::Idle));
        assert_eq!(m.command(Intent::Down, 2000.0, &b), (VelocityCommand::Stop, Intent::Idle));
        // moving away from a reached bound is still allowed
        assert_eq!(m.command(Intent::Down, b.upper, &b).0, VelocityCommand::Vertical(25.0));
    }
}
