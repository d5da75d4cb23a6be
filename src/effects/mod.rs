//! Pixel-level effects shared by all compositing backends.

/// Blend modes and premultiplied pixel compositing.
pub mod blend;
/// Gaussian blur.
pub mod blur;
/// Per-layer effect parameters (blur, brightness, contrast).
pub mod fx;
