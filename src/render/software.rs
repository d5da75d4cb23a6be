use crate::{
    effects::blend::{PremulRgba8, blend},
    foundation::{
        core::{Point, Raster, Rect, Rgba8Premul},
        error::{ForgeError, ForgeResult},
    },
    render::backend::{CompositeJob, LayerDraw, RenderBackend},
};

const NAME: &str = "software";

/// Pixel-loop compositor. Slower than [`crate::render::vello::VelloCpuBackend`] but
/// supports every blend mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareBackend;

impl SoftwareBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(level = "trace", skip_all, fields(layers = job.layers.len()))]
    fn composite(&self, job: &CompositeJob) -> ForgeResult<Raster> {
        let [r, g, b, a] = job.background_rgba;
        let mut out = Raster::filled(
            job.canvas.width,
            job.canvas.height,
            Rgba8Premul::from_straight_rgba(r, g, b, a),
        )
        .map_err(|e| ForgeError::backend(NAME, e.to_string()))?;

        for layer in &job.layers {
            draw_layer(&mut out, layer);
        }
        Ok(out)
    }
}

fn draw_layer(dst: &mut Raster, layer: &LayerDraw) {
    let opacity = layer.opacity.clamp(0.0, 1.0);
    let src = layer.raster.as_ref();
    if opacity <= 0.0 || src.width == 0 || src.height == 0 {
        return;
    }
    // Zero scale collapses the layer to nothing.
    if layer.transform.determinant().abs() < 1e-12 {
        return;
    }
    let inv = layer.transform.inverse();

    let bounds = layer.transform.transform_rect_bbox(Rect::new(
        0.0,
        0.0,
        f64::from(src.width),
        f64::from(src.height),
    ));
    let x0 = bounds.x0.floor().max(0.0) as u32;
    let y0 = bounds.y0.floor().max(0.0) as u32;
    let x1 = (bounds.x1.ceil().max(0.0) as u32).min(dst.width);
    let y1 = (bounds.y1.ceil().max(0.0) as u32).min(dst.height);

    let (src_w, src_h) = (f64::from(src.width), f64::from(src.height));
    let stride = dst.width as usize * 4;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if p.x < 0.0 || p.y < 0.0 || p.x >= src_w || p.y >= src_h {
                continue;
            }
            let s = sample_bilinear(src, p.x, p.y);
            if s[3] == 0 {
                continue;
            }
            let i = y as usize * stride + x as usize * 4;
            let d = [
                dst.data[i],
                dst.data[i + 1],
                dst.data[i + 2],
                dst.data[i + 3],
            ];
            dst.data[i..i + 4].copy_from_slice(&blend(d, s, opacity, layer.blend));
        }
    }
}

/// Bilinear sample at continuous pixel coordinates, clamping to the edge texels.
fn sample_bilinear(src: &Raster, u: f64, v: f64) -> PremulRgba8 {
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = texel(src, x0, y0);
    let p10 = texel(src, x0 + 1, y0);
    let p01 = texel(src, x0, y0 + 1);
    let p11 = texel(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) * (1.0 - tx) + f32::from(p10[c]) * tx;
        let bottom = f32::from(p01[c]) * (1.0 - tx) + f32::from(p11[c]) * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn texel(src: &Raster, x: i64, y: i64) -> PremulRgba8 {
    let x = x.clamp(0, i64::from(src.width) - 1);
    let y = y.clamp(0, i64::from(src.height) - 1);
    src.pixel(x as u32, y as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/render/software.rs"]
mod tests;
