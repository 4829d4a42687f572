use glam::Vec2;

use crate::model::ShapeDef;

/// Velocities are expressed per step of this length (60 Hz)
pub const STEP_MS: f32 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// Which edges of the world stop bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Walls {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
    pub walls: Walls,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32, walls: Walls) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
            walls,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub sprite_key: String,
    pub label: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub mass: f32,
    pub angle: f32,
    pub scale: f32,
}

/// What the scene needs from a physics engine. The scene only ever issues
/// commands; integrating positions is the engine's business.
pub trait Physics {
    fn configure_world(&mut self, bounds: WorldBounds, gravity: Vec2);
    fn add_body(&mut self, position: Vec2, sprite_key: &str, shape: &ShapeDef, scale: f32) -> BodyId;
    fn set_velocity_x(&mut self, id: BodyId, vx: f32);
    fn set_velocity_y(&mut self, id: BodyId, vy: f32);
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);
    fn set_mass(&mut self, id: BodyId, mass: f32);
    fn set_angle(&mut self, id: BodyId, angle: f32);
    fn body(&self, id: BodyId) -> Option<&Body>;
    fn step(&mut self, dt_ms: f32);
}

/// Minimal engine: bodies move at constant velocity (plus gravity, if set)
/// and stop at enabled world walls. Bodies do not collide with each other.
pub struct KinematicWorld {
    pub bounds: Option<WorldBounds>,
    pub gravity: Vec2,
    bodies: Vec<Body>,
}

impl KinematicWorld {
    pub fn new() -> Self {
        Self {
            bounds: None,
            gravity: Vec2::ZERO,
            bodies: Vec::new(),
        }
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let body = self.bodies.get_mut(id.0);
        if body.is_none() {
            tracing::warn!(?id, "command for unknown body ignored");
        }
        body
    }
}

impl Default for KinematicWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics for KinematicWorld {
    fn configure_world(&mut self, bounds: WorldBounds, gravity: Vec2) {
        self.bounds = Some(bounds);
        self.gravity = gravity;
    }

    fn add_body(&mut self, position: Vec2, sprite_key: &str, shape: &ShapeDef, scale: f32) -> BodyId {
        self.bodies.push(Body {
            sprite_key: sprite_key.to_string(),
            label: shape.label.clone(),
            position,
            velocity: Vec2::ZERO,
            half_extents: shape.half_extents() * scale,
            mass: 1.0,
            angle: 0.0,
            scale,
        });
        BodyId(self.bodies.len() - 1)
    }

    fn set_velocity_x(&mut self, id: BodyId, vx: f32) {
        if let Some(b) = self.body_mut(id) {
            b.velocity.x = vx;
        }
    }

    fn set_velocity_y(&mut self, id: BodyId, vy: f32) {
        if let Some(b) = self.body_mut(id) {
            b.velocity.y = vy;
        }
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(b) = self.body_mut(id) {
            b.velocity = velocity;
        }
    }

    fn set_mass(&mut self, id: BodyId, mass: f32) {
        if let Some(b) = self.body_mut(id) {
            b.mass = mass;
        }
    }

    fn set_angle(&mut self, id: BodyId, angle: f32) {
        if let Some(b) = self.body_mut(id) {
            b.angle = angle;
        }
    }

    fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    fn step(&mut self, dt_ms: f32) {
        let steps = dt_ms / STEP_MS;
        for body in self.bodies.iter_mut() {
            body.velocity += self.gravity * steps;
            body.position += body.velocity * steps;

            let Some(bounds) = self.bounds else { continue };
            let lo = bounds.min + body.half_extents;
            let hi = bounds.max - body.half_extents;
            if bounds.walls.bottom && body.position.y > hi.y {
                body.position.y = hi.y;
                body.velocity.y = body.velocity.y.min(0.0);
            }
            if bounds.walls.top && body.position.y < lo.y {
                body.position.y = lo.y;
                body.velocity.y = body.velocity.y.max(0.0);
            }
            if bounds.walls.right && body.position.x > hi.x {
                body.position.x = hi.x;
                body.velocity.x = body.velocity.x.min(0.0);
            }
            if bounds.walls.left && body.position.x < lo.x {
                body.position.x = lo.x;
                body.velocity.x = body.velocity.x.max(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeTable;

    fn square() -> ShapeDef {
        let json = r#"{ "sq": { "label": "sq", "fixtures": [ { "vertices": [[ {"x":0,"y":0}, {"x":20,"y":0}, {"x":20,"y":20}, {"x":0,"y":20} ]] } ] } }"#;
        ShapeTable::from_json(json).unwrap().get("sq").unwrap().clone()
    }

    #[test]
    fn test_constant_velocity_per_step() {
        let mut world = KinematicWorld::new();
        let id = world.add_body(Vec2::new(100.0, 100.0), "rock", &square(), 1.0);
        world.set_velocity_x(id, -10.0);
        world.step(STEP_MS * 3.0);
        let b = world.body(id).unwrap();
        assert!((b.position.x - 70.0).abs() < 1e-3);
        assert_eq!(b.position.y, 100.0);
    }

    #[test]
    fn test_bottom_wall_only() {
        let mut world = KinematicWorld::new();
        world.configure_world(
            WorldBounds::new(200.0, 200.0, Walls { bottom: true, ..Default::default() }),
            Vec2::ZERO,
        );
        let id = world.add_body(Vec2::new(100.0, 180.0), "rock", &square(), 1.0);
        world.set_velocity(id, Vec2::new(-200.0, 50.0));
        world.step(STEP_MS);
        let b = world.body(id).unwrap();
        assert_eq!(b.position.y, 190.0, "stopped at floor minus half height");
        assert_eq!(b.velocity.y, 0.0);
        assert!(b.position.x < 0.0, "no left wall, body leaves the screen");
    }

    #[test]
    fn test_scale_applies_to_extents() {
        let mut world = KinematicWorld::new();
        let id = world.add_body(Vec2::ZERO, "player", &square(), 0.5);
        assert_eq!(world.body(id).unwrap().half_extents, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_unknown_body_is_ignored() {
        let mut world = KinematicWorld::new();
        world.set_mass(BodyId(7), 3.0);
        assert!(world.is_empty());
    }
}
