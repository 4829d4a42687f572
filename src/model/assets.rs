use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::Level;
use crate::error::ConfigError;

const OBSTACLE_SHAPES_JSON: &str = include_str!("../../assets/physics.json");
const FISH_SHAPES_JSON: &str = include_str!("../../assets/fish-physics.json");
const SPRITES_JSON: &str = include_str!("../../assets/sprites.json");

/// Shape key and sprite key used for the player fish
pub const PLAYER_SHAPE: &str = "fish1";
pub const PLAYER_SPRITE: &str = "player";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A PhysicsEditor fixture: one or more convex polygons
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub vertices: Vec<Vec<Point>>,
}

/// Collision outline of a sprite, in the sprite's own pixel space. Only the
/// outline and label are read; material keys in the export are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeDef {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

impl ShapeDef {
    fn points(&self) -> impl Iterator<Item = &Point> {
        self.fixtures
            .iter()
            .flat_map(|f| f.vertices.iter())
            .flat_map(|poly| poly.iter())
    }

    /// Axis-aligned bounds over every fixture vertex, `None` for an empty shape
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.points().fold(None, |acc, p| {
            let v = Vec2::new(p.x, p.y);
            Some(match acc {
                None => (v, v),
                Some((min, max)) => (min.min(v), max.max(v)),
            })
        })
    }

    pub fn half_extents(&self) -> Vec2 {
        self.bounds()
            .map(|(min, max)| (max - min) * 0.5)
            .unwrap_or(Vec2::ZERO)
    }
}

/// Named physics shapes, looked up by key at spawn time.
#[derive(Debug, Clone, Default)]
pub struct ShapeTable {
    shapes: HashMap<String, ShapeDef>,
}

impl ShapeTable {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse { what: "physics shapes", source })?;

        // PhysicsEditor exports carry a "generator_info" string next to the shapes
        let mut shapes = HashMap::new();
        for (key, value) in raw {
            if !value.is_object() {
                continue;
            }
            let shape: ShapeDef = serde_json::from_value(value)
                .map_err(|source| ConfigError::Parse { what: "physics shapes", source })?;
            if shape.bounds().is_none() {
                return Err(ConfigError::EmptyShape { key });
            }
            shapes.insert(key, shape);
        }
        Ok(Self { shapes })
    }

    pub fn get(&self, key: &str) -> Result<&ShapeDef, ConfigError> {
        self.shapes
            .get(key)
            .ok_or_else(|| ConfigError::UnknownShape { key: key.to_string() })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shapes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpriteInfo {
    pub width: f32,
    pub height: f32,
    pub tint: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct SpriteCatalog {
    sprites: HashMap<String, SpriteInfo>,
}

impl SpriteCatalog {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let sprites = serde_json::from_str(json).map_err(|source| ConfigError::Parse { what: "sprites", source })?;
        Ok(Self { sprites })
    }

    pub fn get(&self, key: &str) -> Result<&SpriteInfo, ConfigError> {
        self.sprites
            .get(key)
            .ok_or_else(|| ConfigError::UnknownSprite { key: key.to_string() })
    }

    /// Tint for a sprite key, white if the key is unknown
    pub fn tint(&self, key: &str) -> [f32; 4] {
        self.sprites.get(key).map(|s| s.tint).unwrap_or([1.0; 4])
    }
}

/// Frame-cycling animation (frame index only, drawing is up to the renderer)
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub key: &'static str,
    pub frames: usize,
    pub frame_rate: f32,
    /// -1 loops forever, otherwise the number of extra cycles after the first
    pub repeat: i32,
}

impl Animation {
    pub fn fish_swim() -> Self {
        Self {
            key: "fish-swim",
            frames: 2,
            frame_rate: 3.0,
            repeat: -1,
        }
    }

    pub fn frame_at(&self, elapsed_ms: u64) -> usize {
        if self.frames == 0 || self.frame_rate <= 0.0 {
            return 0;
        }
        let step = (elapsed_ms as f64 * self.frame_rate as f64 / 1000.0) as u64;
        let cycles = step / self.frames as u64;
        if self.repeat >= 0 && cycles > self.repeat as u64 {
            return self.frames - 1;
        }
        (step % self.frames as u64) as usize
    }
}

/// Everything the scene needs before `create`: shape tables, sprite sizes
/// and the player's animation.
#[derive(Debug, Clone)]
pub struct Assets {
    pub obstacle_shapes: ShapeTable,
    pub fish_shapes: ShapeTable,
    pub sprites: SpriteCatalog,
    pub player_anim: Animation,
}

impl Assets {
    /// Parse the bundled asset tables.
    pub fn preload() -> Result<Self, ConfigError> {
        let assets = Self {
            obstacle_shapes: ShapeTable::from_json(OBSTACLE_SHAPES_JSON)?,
            fish_shapes: ShapeTable::from_json(FISH_SHAPES_JSON)?,
            sprites: SpriteCatalog::from_json(SPRITES_JSON)?,
            player_anim: Animation::fish_swim(),
        };
        tracing::info!(
            obstacle_shapes = assets.obstacle_shapes.len(),
            fish_shapes = assets.fish_shapes.len(),
            "assets preloaded"
        );
        Ok(assets)
    }

    /// Check every key the level and the player refer to.
    pub fn validate(&self, level: &Level) -> Result<(), ConfigError> {
        self.fish_shapes.get(PLAYER_SHAPE)?;
        self.sprites.get(PLAYER_SPRITE)?;
        for obstacle in &level.obstacles {
            self.sprites.get(&obstacle.sprite_key)?;
            self.obstacle_shapes.get(&obstacle.shape_key)?;
        }
        Ok(())
    }
}
