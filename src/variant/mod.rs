//! Variant rendering: cover-fit stills, animated loops, and the collection preview.

/// Periodic frame perturbation and frame-sequence synthesis.
pub mod animate;
/// Cover-fit resizing and still/GIF encoders.
pub mod encode;
/// Batch-level preview sequence.
pub mod preview;
/// Per-asset variant rendering.
pub mod renderer;
/// Frame sinks (in-memory, GIF).
pub mod sink;
/// Output formats and variant/preview settings.
pub mod spec;
