// Overstack Schema - Shared type definitions
// This crate contains the core enums and data shapes shared between the
// engine and the RON data files it embeds (skills, traits, enemies, player).

// Re-export the main types
pub use catalog_types::*;
pub use combat_types::*;
pub use effect_types::*;

pub mod catalog_types;
pub mod combat_types;
pub mod effect_types;
