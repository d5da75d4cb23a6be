//! Shared types used by every stage of the generation pipeline.

/// Canvas, colors, and the premultiplied raster type.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
