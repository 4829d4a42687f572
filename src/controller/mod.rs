// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod intent;
pub mod motion;
pub mod physics;
pub mod scheduler;
pub mod spawner;
#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use input::{InputEvent, InputProcessor, InputSample, InputState};
pub use intent::{InputPriority, InputResolver, Intent};
pub use motion::{MotionBounds, MotionController, VelocityCommand};
pub use physics::{Body, BodyId, KinematicWorld, Physics};
pub use scheduler::{ObstacleScheduler, SceneClock};
pub use spawner::ObstacleSpawner;
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoopContext;
