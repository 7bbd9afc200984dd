//! Camera and render-submission interface for StarFaux.

pub mod camera;
pub mod sink;

pub use camera::*;
pub use sink::*;
