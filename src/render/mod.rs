//! Compositing: job planning, the backend trait, and the fallback chain.

/// Backend trait and job types.
pub mod backend;
/// Ordered fallback chain and job planning.
pub mod compositor;
/// Canvas, placement, blend and effect options.
pub mod options;
/// Pixel-loop backend.
pub mod software;
/// `vello_cpu` backend.
pub mod vello;
