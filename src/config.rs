use serde::Deserialize;
use std::path::Path;

use crate::controller::intent::InputPriority;
use crate::error::ConfigError;
use crate::model::ObstacleDescriptor;

/// Built-in level, used unless a level file is supplied.
pub const DEFAULT_LEVEL_JSON: &str = include_str!("../assets/level.json");

/// Tunables for one scene. Every field has a default, so a level file only
/// needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub player_x: f32,
    pub player_scale: f32,
    /// Vertical player speed in pixels per physics step
    pub player_speed: f32,
    /// Pointer travel (pixels) that still counts as a tap rather than a swipe
    pub dead_band: f32,
    pub obstacle_velocity_x: f32,
    pub obstacle_mass: f32,
    pub input_priority: InputPriority,
    pub gravity_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920,
            canvas_height: 1080,
            player_x: 300.0,
            player_scale: 0.5,
            player_speed: 25.0,
            dead_band: 10.0,
            obstacle_velocity_x: -10.0,
            obstacle_mass: 200.0,
            input_priority: InputPriority::KeyboardOverPointer,
            gravity_enabled: false,
        }
    }
}

/// The editable part of the game: scene tunables plus the ordered obstacle list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Level {
    pub config: GameConfig,
    pub obstacles: Vec<ObstacleDescriptor>,
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse { what: "level", source })
    }

    /// Read a level file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_LEVEL_JSON)
    }
}
