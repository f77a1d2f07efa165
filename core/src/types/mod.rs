//! Value types shared between the protocol layer and the session engine.

mod character;
mod entity;
mod position;

// Re-export all types
pub use character::CharacterProfile;
pub use entity::{EntityAction, EntityKind};
pub use position::{decode_pos_dir, direction_towards, encode_pos_dir, round_coord, Cell};
