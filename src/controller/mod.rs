// CONTROLLER: input, collision, movement and the update loop
pub mod input;
pub mod spatial;
pub mod movement;
pub mod session;
pub mod frame_loop;

pub use input::{GamepadSnapshot, GamepadSource, InputController, InputEvent, KeyBindings, MoveIntent, NoGamepads};
pub use spatial::{Obstacle, ObstacleId, SpatialIndex};
pub use movement::{Arena, MovementController, StepOutcome};
pub use session::GameSession;
pub use frame_loop::{FrameLoopContext, FrameReport};
