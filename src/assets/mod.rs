//! Trait source decoding and the per-run decoded trait cache.

/// Byte-level decoding of raster and SVG trait sources.
pub mod decode;
/// Memoized decoded trait rasters.
pub mod store;
