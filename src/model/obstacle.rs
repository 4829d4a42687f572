use serde::Deserialize;

/// One scheduled obstacle: where it appears, what it looks like, which
/// physics outline it uses and how long after scene start it shows up.
///
/// Also accepts the older `name`/`outline`/`time` field names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleDescriptor {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "name")]
    pub sprite_key: String,
    #[serde(rename = "physicsShapeKey", alias = "outline")]
    pub shape_key: String,
    #[serde(alias = "time")]
    pub delay_ms: u64,
}

impl ObstacleDescriptor {
    pub fn new(x: f32, y: f32, sprite_key: &str, shape_key: &str, delay_ms: u64) -> Self {
        Self {
            x,
            y,
            sprite_key: sprite_key.to_string(),
            shape_key: shape_key.to_string(),
            delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_field_names() {
        let json = r#"{ "x": 2200, "y": 880, "spriteKey": "rockObstacle", "physicsShapeKey": "rock", "delayMs": 1000 }"#;
        let d: ObstacleDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d, ObstacleDescriptor::new(2200.0, 880.0, "rockObstacle", "rock", 1000));
    }

    #[test]
    fn test_parse_legacy_field_names() {
        let json = r#"{ "x": 2200, "y": 930, "name": "obstacle-ship", "outline": "ship", "time": 7000 }"#;
        let d: ObstacleDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.sprite_key, "obstacle-ship");
        assert_eq!(d.shape_key, "ship");
        assert_eq!(d.delay_ms, 7000);
    }
}
