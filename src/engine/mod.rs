// Engine seams: the external collaborators the combat core calls into
//
// Motor, animator, input and spatial queries are owned by the host engine.
// The core only sees the traits here plus small in-process implementations
// used by tests and the headless demo.

pub mod animator;
pub mod game_loop;
pub mod input;
pub mod motor;
pub mod spatial;

pub use animator::{AnimParam, Animator, NullAnimator, RecordingAnimator};
pub use game_loop::{GameLoop, FIXED_TIMESTEP};
pub use motor::{KinematicMotor, Motor};
pub use spatial::{EntityId, HitVolume, SpatialQuery};
