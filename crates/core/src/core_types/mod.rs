//! Core value types shared by every subsystem

pub mod material;
pub mod vec2;

pub use material::{Cell, MaterialId, MaterialInfo};
pub use vec2::Vec2;
