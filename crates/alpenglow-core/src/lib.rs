//! Numerically-exact 2D rasterizer: grid-snapped integer arrangement,
//! winding-tagged faces, a compositing expression tree, and a tile-based
//! rasterizer that resolves to premultiplied-linear or display color spaces.

pub mod arrangement;
pub mod clip;
pub mod config;
pub mod error;
pub mod faces;
pub mod numeric;
pub mod parallel;
pub mod pipeline;
pub mod program;
pub mod raster;
pub mod rasterclip;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::AlpenglowError;
