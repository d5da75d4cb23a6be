use std::sync::Arc;

use crate::{
    effects::blend::BlendMode,
    foundation::{
        core::{Affine, Raster},
        error::{ForgeError, ForgeResult},
    },
    render::backend::{CompositeJob, RenderBackend},
};

const NAME: &str = "vello";

/// Compositor backed by `vello_cpu`. Rejects jobs that need a non-normal blend mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct VelloCpuBackend;

impl VelloCpuBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for VelloCpuBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(level = "trace", skip_all, fields(layers = job.layers.len()))]
    fn composite(&self, job: &CompositeJob) -> ForgeResult<Raster> {
        if let Some(l) = job.layers.iter().find(|l| l.blend != BlendMode::Normal) {
            return Err(ForgeError::backend(
                NAME,
                format!(
                    "blend mode '{}' on layer '{}' is not supported",
                    l.blend.as_str(),
                    l.layer
                ),
            ));
        }
        let (w, h) = dims_u16(job.canvas.width, job.canvas.height)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = job.background_rgba;
        if a > 0 {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(w),
                f64::from(h),
            ));
        }

        for layer in &job.layers {
            let opacity = layer.opacity.clamp(0.0, 1.0);
            if opacity <= 0.0 {
                continue;
            }
            let pixmap = pixmap_from_raster(&layer.raster)?;
            let paint = vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            };

            ctx.set_transform(affine_to_cpu(layer.transform));
            ctx.set_paint(paint);
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(layer.raster.width),
                f64::from(layer.raster.height),
            ));
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }

        ctx.flush();
        let mut out = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut out);
        Raster::from_premul(
            job.canvas.width,
            job.canvas.height,
            out.data_as_u8_slice().to_vec(),
        )
    }
}

fn dims_u16(width: u32, height: u32) -> ForgeResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ForgeError::backend(NAME, "width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ForgeError::backend(NAME, "height exceeds u16"))?;
    Ok((w, h))
}

fn pixmap_from_raster(raster: &Raster) -> ForgeResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(raster.width, raster.height)?;
    // Pixmap stores PremulRgba8; raster bytes are already premultiplied.
    let pixels = raster
        .data
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/vello.rs"]
mod tests;
