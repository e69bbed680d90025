// Character attributes
//
// - Attribute: clamped value with change listeners
// - Status: transient flags with optional expiry
// - CharacterAttributes: the per-character resource set and regeneration

pub mod attribute;
pub mod container;
pub mod status;

pub use attribute::{Attribute, ValueChange};
pub use container::CharacterAttributes;
pub use status::{Status, StatusFlags, StatusKind};
