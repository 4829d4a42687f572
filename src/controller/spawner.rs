use glam::Vec2;

use super::physics::{BodyId, Physics};
use crate::error::ConfigError;
use crate::model::{ObstacleDescriptor, ShapeTable};

/// Creates obstacle bodies from descriptors
pub struct ObstacleSpawner {
    shapes: ShapeTable,
    pub velocity_x: f32,
    pub mass: f32,
}

impl ObstacleSpawner {
    pub fn new(shapes: ShapeTable, velocity_x: f32, mass: f32) -> Self {
        Self { shapes, velocity_x, mass }
    }

    pub fn spawn<P: Physics>(&self, physics: &mut P, descriptor: &ObstacleDescriptor) -> Result<BodyId, ConfigError> {
        let shape = self.shapes.get(&descriptor.shape_key)?;
        let id = physics.add_body(
            Vec2::new(descriptor.x, descriptor.y),
            &descriptor.sprite_key,
            shape,
            1.0,
        );
        physics.set_velocity_x(id, self.velocity_x);
        physics.set_mass(id, self.mass);
        tracing::info!(
            sprite = %descriptor.sprite_key,
            shape = %descriptor.shape_key,
            x = descriptor.x,
            y = descriptor.y,
            "obstacle spawned"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::physics::KinematicWorld;
    use crate::model::Assets;

    #[test]
    fn test_rock_spawn() {
        let assets = Assets::preload().unwrap();
        let spawner = ObstacleSpawner::new(assets.obstacle_shapes, -10.0, 200.0);
        let mut world = KinematicWorld::new();
        let d = ObstacleDescriptor::new(2200.0, 880.0, "rockObstacle", "rock", 1000);
        let id = spawner.spawn(&mut world, &d).unwrap();
        let body = world.body(id).unwrap();
        assert_eq!(body.position, Vec2::new(2200.0, 880.0));
        assert_eq!(body.velocity, Vec2::new(-10.0, 0.0));
        assert_eq!(body.mass, 200.0);
        assert_eq!(body.sprite_key, "rockObstacle");
        assert_eq!(body.label, "rock");
    }

    #[test]
    fn test_unknown_shape_fails_without_body() {
        let assets = Assets::preload().unwrap();
        let spawner = ObstacleSpawner::new(assets.obstacle_shapes, -10.0, 200.0);
        let mut world = KinematicWorld::new();
        let d = ObstacleDescriptor::new(0.0, 0.0, "rockObstacle", "reef", 0);
        assert!(matches!(spawner.spawn(&mut world, &d), Err(ConfigError::UnknownShape { .. })));
        assert!(world.is_empty());
    }
}
