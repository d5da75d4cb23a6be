use std::sync::Arc;

use crate::{
    effects::fx::apply_effects,
    foundation::{
        core::{Affine, Canvas, Raster, Rgba8Premul, Vec2},
        error::{ForgeError, ForgeResult},
    },
    render::{
        backend::{BackendKind, CompositeJob, LayerDraw, RenderBackend, create_backend},
        options::{CompositeOptions, LayerPlacement},
    },
};

/// Backend name reported when every backend failed and the first layer was returned as-is.
pub const FALLBACK_BACKEND: &str = "first-layer";

/// A decoded trait raster tagged with the layer it belongs to.
#[derive(Clone, Debug)]
pub struct ResolvedLayer {
    /// Layer name.
    pub layer: String,
    /// Decoded trait raster.
    pub raster: Arc<Raster>,
}

/// Periodic per-frame adjustment applied to the non-background layers of a job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perturbation {
    /// Rotation about the canvas center, in radians.
    pub rotation_rad: f64,
    /// Uniform scale about the canvas center.
    pub scale: f64,
    /// Opacity multiplier.
    pub opacity: f32,
}

impl Perturbation {
    /// No-op perturbation.
    pub fn identity() -> Self {
        Self {
            rotation_rad: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    /// Canvas-space transform rotating and scaling about `canvas`'s center.
    pub fn transform(&self, canvas: Canvas) -> Affine {
        let c = canvas.center().to_vec2();
        Affine::translate(c)
            * Affine::rotate(self.rotation_rad)
            * Affine::scale(self.scale)
            * Affine::translate(-c)
    }
}

/// Result of one composite call.
#[derive(Clone, Debug)]
pub struct CompositeOutcome {
    /// Flattened raster.
    pub raster: Raster,
    /// Name of the backend that produced `raster`, or [`FALLBACK_BACKEND`].
    pub backend: &'static str,
    /// Per-backend failure messages collected before success.
    pub failures: Vec<String>,
}

impl CompositeOutcome {
    /// Whether the terminal fallback produced the raster.
    pub fn is_degraded(&self) -> bool {
        self.backend == FALLBACK_BACKEND
    }
}

/// Ordered chain of backends tried first-success.
pub struct Compositor {
    backends: Vec<Box<dyn RenderBackend>>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("backends", &self.backend_names())
            .finish()
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::from_kinds(&BackendKind::default_chain())
    }
}

impl Compositor {
    /// Chain of caller-supplied backends, tried in order.
    pub fn new(backends: Vec<Box<dyn RenderBackend>>) -> Self {
        Self { backends }
    }

    /// Chain of built-in backends.
    pub fn from_kinds(kinds: &[BackendKind]) -> Self {
        Self::new(kinds.iter().copied().map(create_backend).collect())
    }

    /// Backend names in priority order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Flatten `job`, falling through backends on error. When every backend fails the
    /// first layer's raster is returned unmodified.
    #[tracing::instrument(level = "debug", skip_all, fields(layers = job.layers.len()))]
    pub fn composite(&self, job: &CompositeJob) -> ForgeResult<CompositeOutcome> {
        let mut failures = Vec::new();
        for backend in &self.backends {
            match backend.composite(job) {
                Ok(raster) if raster.canvas() == job.canvas => {
                    return Ok(CompositeOutcome {
                        raster,
                        backend: backend.name(),
                        failures,
                    });
                }
                Ok(raster) => {
                    let msg = format!(
                        "backend returned {}x{}, expected {}x{}",
                        raster.width, raster.height, job.canvas.width, job.canvas.height
                    );
                    tracing::warn!(backend = backend.name(), "{msg}; trying next backend");
                    failures.push(format!("{}: {msg}", backend.name()));
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "backend failed; trying next backend");
                    failures.push(e.to_string());
                }
            }
        }

        let raster = match job.layers.first() {
            Some(first) => first.raster.as_ref().clone(),
            None => {
                let [r, g, b, a] = job.background_rgba;
                Raster::filled(
                    job.canvas.width,
                    job.canvas.height,
                    Rgba8Premul::from_straight_rgba(r, g, b, a),
                )?
            }
        };
        tracing::warn!(
            failures = failures.len(),
            "all backends failed; returning first layer unmodified"
        );
        Ok(CompositeOutcome {
            raster,
            backend: FALLBACK_BACKEND,
            failures,
        })
    }
}

/// Build a job from decoded layers: apply effects, placement, blend and opacity.
pub fn plan_job(options: &CompositeOptions, layers: &[ResolvedLayer]) -> ForgeResult<CompositeJob> {
    let canvas = options.canvas;
    let mut draws = Vec::with_capacity(layers.len());
    for l in layers {
        let placement = options.placement(&l.layer);
        let raster = apply_effects(&l.raster, &options.effects_for(&l.layer))?;
        let transform = placement_transform(canvas, &placement, &raster)?;
        draws.push(LayerDraw {
            layer: l.layer.clone(),
            raster,
            transform,
            opacity: (placement.opacity * options.opacity).clamp(0.0, 1.0),
            blend: placement.blend.unwrap_or(options.blend),
        });
    }
    Ok(CompositeJob {
        canvas,
        background_rgba: options.background,
        layers: draws,
    })
}

/// Copy of `job` with `p` applied to every layer except the first (when there is more
/// than one layer).
pub fn perturb_job(job: &CompositeJob, p: Perturbation) -> CompositeJob {
    let mut out = job.clone();
    let skip = usize::from(out.layers.len() > 1);
    let t = p.transform(job.canvas);
    for layer in out.layers.iter_mut().skip(skip) {
        layer.transform = t * layer.transform;
        layer.opacity = (layer.opacity * p.opacity).clamp(0.0, 1.0);
    }
    out
}

/// Map raster pixel space onto the placed layer rectangle in canvas space.
pub fn placement_transform(
    canvas: Canvas,
    placement: &LayerPlacement,
    raster: &Raster,
) -> ForgeResult<Affine> {
    if raster.width == 0 || raster.height == 0 {
        return Err(ForgeError::decode("trait raster has zero size"));
    }
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let w = cw * placement.scale;
    let h = ch * placement.scale;
    let origin = Vec2::new((cw - w) / 2.0 + placement.x, (ch - h) / 2.0 + placement.y);
    Ok(Affine::translate(origin)
        * Affine::scale_non_uniform(w / f64::from(raster.width), h / f64::from(raster.height)))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
