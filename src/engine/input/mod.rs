// Input seam
//
// The core never reads devices. Each tick a controller (player device glue or
// an AI brain) hands the character an `InputFrame`; press actions go through
// a short `InputBuffer` so a press made a few ticks early is still honored.
//
// - `action`: press actions
// - `buffer`: time-based press buffer
// - `frame`: per-tick polled input

pub mod action;
pub mod buffer;
pub mod frame;

// Re-export commonly used types
pub use action::Action;
pub use buffer::InputBuffer;
pub use frame::InputFrame;
