use crate::foundation::{
    core::{Raster, byte_len},
    error::{ForgeError, ForgeResult},
};

/// Separable gaussian blur over premultiplied RGBA8, clamped at the edges.
pub fn blur_raster(src: &Raster, radius: u32, sigma: f32) -> ForgeResult<Raster> {
    let expected_len = byte_len(src.width, src.height)?;
    if src.data.len() != expected_len {
        return Err(ForgeError::backend(
            "effects",
            "blur expects src matching width*height*4",
        ));
    }
    if radius == 0 || src.width == 0 || src.height == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    blur_pass(&src.data, &mut tmp, src.width, src.height, &kernel, Axis::Horizontal);
    blur_pass(&tmp, &mut out, src.width, src.height, &kernel, Axis::Vertical);
    Raster::from_premul(src.width, src.height, out)
}

/// Gaussian taps in Q16 fixed point, summing to exactly `1 << 16`.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ForgeResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ForgeError::configuration("blur sigma must be > 0"));
    }

    let r = i64::from(radius);
    let denom = 2.0 * f64::from(sigma).powi(2);
    let taps: Vec<f64> = (-r..=r)
        .map(|i| (-(i * i) as f64 / denom).exp())
        .collect();
    let sum: f64 = taps.iter().sum();

    let mut weights: Vec<u32> = taps
        .iter()
        .map(|t| ((t / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Rounding residue goes to the center tap.
    let total: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + (1 << 16) - total).clamp(0, 1 << 16) as u32;
    Ok(weights)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One 1-D convolution along `axis`, clamping reads at the raster edge.
fn blur_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let (w, h) = (width as usize, height as usize);
    let radius = (k.len() / 2) as isize;
    let (span, step) = match axis {
        Axis::Horizontal => (w, 4),
        Axis::Vertical => (h, w * 4),
    };

    for y in 0..h {
        for x in 0..w {
            let here = (y * w + x) * 4;
            let pos = match axis {
                Axis::Horizontal => x,
                Axis::Vertical => y,
            };
            let line_start = here - pos * step;

            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let s = (pos as isize + ki as isize - radius).clamp(0, span as isize - 1) as usize;
                let idx = line_start + s * step;
                for (a, &v) in acc.iter_mut().zip(&src[idx..idx + 4]) {
                    *a += u64::from(kw) * u64::from(v);
                }
            }
            for (d, a) in dst[here..here + 4].iter_mut().zip(acc) {
                *d = q16_to_u8(a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
