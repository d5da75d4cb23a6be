use std::sync::Arc;

use crate::{
    foundation::{core::Raster, error::ForgeResult},
    render::{backend::CompositeJob, compositor::Compositor},
    variant::{
        animate::{AnimationParams, render_frames},
        encode::{cover_fit, encode_still},
        preview::render_preview,
        sink::GifSink,
        spec::{PreviewSpec, VariantBuffer, VariantSpec},
    },
};

/// Produces sized and encoded outputs from a finished composite.
#[derive(Clone, Debug)]
pub struct VariantRenderer {
    compositor: Arc<Compositor>,
    animation: AnimationParams,
    bg_rgba: [u8; 4],
}

impl VariantRenderer {
    /// Renderer sharing `compositor` for animated re-compositing; `bg_rgba` is used when
    /// flattening alpha for formats that cannot carry it.
    pub fn new(compositor: Arc<Compositor>, bg_rgba: [u8; 4]) -> Self {
        Self {
            compositor,
            animation: AnimationParams::default(),
            bg_rgba,
        }
    }

    /// Override the animation amplitudes.
    pub fn with_animation(mut self, animation: AnimationParams) -> Self {
        self.animation = animation;
        self
    }

    /// Animation amplitudes in use.
    pub fn animation(&self) -> &AnimationParams {
        &self.animation
    }

    /// Render one variant. Stills are cover-fit from `composite`; animated variants
    /// re-composite `job` per frame.
    #[tracing::instrument(level = "debug", skip_all, fields(variant = %spec.name))]
    pub fn render(
        &self,
        composite: &Raster,
        job: &CompositeJob,
        spec: &VariantSpec,
    ) -> ForgeResult<VariantBuffer> {
        spec.validate()?;
        if spec.animated {
            let mut sink = GifSink::new(spec.quality, self.bg_rgba);
            render_frames(&self.compositor, job, spec, &self.animation, &mut sink)?;
            return Ok(VariantBuffer {
                name: spec.name.clone(),
                width: spec.width,
                height: spec.height,
                format: spec.format,
                frame_count: spec.frame_count,
                duration_ms: u64::from(spec.frame_count) * u64::from(spec.delay_ms),
                bytes: sink.into_bytes()?,
            });
        }

        let fitted = cover_fit(composite, spec.width, spec.height)?;
        Ok(VariantBuffer {
            name: spec.name.clone(),
            width: spec.width,
            height: spec.height,
            format: spec.format,
            frame_count: 1,
            duration_ms: 0,
            bytes: encode_still(&fitted, spec.format, spec.quality, self.bg_rgba)?,
        })
    }

    /// Render every spec in order.
    pub fn render_all(
        &self,
        composite: &Raster,
        job: &CompositeJob,
        specs: &[VariantSpec],
    ) -> ForgeResult<Vec<VariantBuffer>> {
        specs
            .iter()
            .map(|spec| self.render(composite, job, spec))
            .collect()
    }

    /// Batch-level looping preview, one frame per `(token_id, composite)`.
    pub fn preview(
        &self,
        frames: &[(u64, &Raster)],
        spec: &PreviewSpec,
    ) -> ForgeResult<VariantBuffer> {
        render_preview(frames, spec, self.bg_rgba)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variant/renderer.rs"]
mod tests;
