//! Core engine types and utilities for StarFaux.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform and pose handling
//! - Frame timing and the fixed-step physics integrator
//! - Easing curves, seeded randomness and the entity pool
//! - Common components and configuration validation errors

pub mod components;
pub mod easing;
pub mod error;
pub mod pool;
pub mod random;
pub mod time;
pub mod transform;

pub use components::*;
pub use easing::*;
pub use error::*;
pub use pool::*;
pub use random::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
