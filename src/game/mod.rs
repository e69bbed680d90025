// Gameplay: characters, their resources and the combat rules between them

pub mod attributes;
pub mod characters;
pub mod combat;
pub mod config;
pub mod error;
pub mod observer;
