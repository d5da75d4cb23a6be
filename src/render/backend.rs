use std::sync::Arc;

use crate::{
    effects::blend::BlendMode,
    foundation::{
        core::{Affine, Canvas, Raster},
        error::ForgeResult,
    },
};

/// One trait raster ready to be drawn.
#[derive(Clone, Debug)]
pub struct LayerDraw {
    /// Layer name, for diagnostics.
    pub layer: String,
    /// Effect-applied trait raster (premultiplied).
    pub raster: Arc<Raster>,
    /// Maps raster pixel space into canvas pixel space.
    pub transform: Affine,
    /// Effective opacity in `[0, 1]`.
    pub opacity: f32,
    /// Effective blend mode.
    pub blend: BlendMode,
}

/// A fully resolved flatten request: canvas, background, and layers back-to-front.
#[derive(Clone, Debug)]
pub struct CompositeJob {
    /// Output size.
    pub canvas: Canvas,
    /// Background color, straight alpha.
    pub background_rgba: [u8; 4],
    /// Layers in draw order.
    pub layers: Vec<LayerDraw>,
}

/// A compositing implementation. Backends are stateless and shared across workers.
pub trait RenderBackend: Send + Sync {
    /// Short stable name used in logs and outcomes.
    fn name(&self) -> &'static str;

    /// Flatten `job` into one raster of exactly `job.canvas` size.
    fn composite(&self, job: &CompositeJob) -> ForgeResult<Raster>;
}

/// Built-in backend kinds, in the order they are usually tried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `vello_cpu` rasterizer. Normal blending only.
    Vello,
    /// Pixel-loop rasterizer supporting every [`BlendMode`].
    Software,
}

impl BackendKind {
    /// Default priority order.
    pub fn default_chain() -> Vec<BackendKind> {
        vec![BackendKind::Vello, BackendKind::Software]
    }
}

/// Instantiate a built-in backend.
pub fn create_backend(kind: BackendKind) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Vello => Box::new(crate::render::vello::VelloCpuBackend::new()),
        BackendKind::Software => Box::new(crate::render::software::SoftwareBackend::new()),
    }
}
