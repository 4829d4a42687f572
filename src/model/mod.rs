// MODEL: Scene state and loaded data
pub mod assets;
pub mod obstacle;
pub mod scene;

pub use assets::{Animation, Assets, ShapeDef, ShapeTable, SpriteCatalog, SpriteInfo};
pub use obstacle::ObstacleDescriptor;
pub use scene::{GameScene, TickReport};
