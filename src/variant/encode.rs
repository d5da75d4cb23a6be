use image::{
    DynamicImage, ImageEncoder, RgbaImage,
    codecs::{
        gif::{GifEncoder, Repeat},
        jpeg::JpegEncoder,
        png::PngEncoder,
        webp::WebPEncoder,
    },
    imageops::{self, FilterType},
};

use crate::{
    foundation::{
        core::Raster,
        error::{ForgeError, ForgeResult},
        math::mul_div255_u16,
    },
    variant::spec::OutputFormat,
};

/// Resize to exactly `width`x`height`, scaling to cover and cropping the overflow
/// symmetrically.
///
/// The crop happens in source space first, so no intermediate image is ever larger than
/// the source or the target.
pub fn cover_fit(src: &Raster, width: u32, height: u32) -> ForgeResult<Raster> {
    if src.width == width && src.height == height {
        return Ok(src.clone());
    }
    if width == 0 || height == 0 || src.width == 0 || src.height == 0 {
        return Err(ForgeError::encode(format!(
            "cannot cover-fit {}x{} into {width}x{height}",
            src.width, src.height
        )));
    }
    // Premultiplied bytes resample correctly as-is.
    let img = RgbaImage::from_raw(src.width, src.height, src.data.clone())
        .ok_or_else(|| ForgeError::encode("raster buffer does not match its dimensions"))?;

    let (cx, cy, cw, ch) = cover_crop(src.width, src.height, width, height);
    let cropped = imageops::crop_imm(&img, cx, cy, cw, ch).to_image();
    let resized = imageops::resize(&cropped, width, height, FilterType::Lanczos3);
    if resized.dimensions() != (width, height) {
        return Err(ForgeError::encode(format!(
            "cover fit produced {:?}, expected {width}x{height}",
            resized.dimensions()
        )));
    }
    let mut data = resized.into_raw();
    // Lanczos ringing can push color above alpha.
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
    Raster::from_premul(width, height, data)
}

/// Centered source rectangle `(x, y, w, h)` with the target's aspect ratio.
fn cover_crop(src_w: u32, src_h: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let (sw, sh, tw, th) = (
        u64::from(src_w),
        u64::from(src_h),
        u64::from(width),
        u64::from(height),
    );
    let (cw, ch) = if sw * th > sh * tw {
        // Source is wider than the target.
        (((sh * tw + th / 2) / th).clamp(1, sw), sh)
    } else {
        (sw, ((sw * th + tw / 2) / tw).clamp(1, sh))
    };
    let (cw, ch) = (cw as u32, ch as u32);
    ((src_w - cw) / 2, (src_h - ch) / 2, cw, ch)
}

/// Flatten a premultiplied raster over an opaque background color.
pub fn flatten_over(src: &Raster, bg_rgba: [u8; 4]) -> Raster {
    let mut out = src.clone();
    for px in out.data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            let v = u16::from(px[c]) + mul_div255_u16(u16::from(bg_rgba[c]), inv);
            px[c] = v.min(255) as u8;
        }
        px[3] = 255;
    }
    out
}

/// Encode a still raster. Formats without alpha are flattened over `bg_rgba` first.
pub fn encode_still(
    src: &Raster,
    format: OutputFormat,
    quality: u8,
    bg_rgba: [u8; 4],
) -> ForgeResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            let img = src.to_rgba_image()?;
            PngEncoder::new(&mut bytes)
                .write_image(
                    img.as_raw(),
                    img.width(),
                    img.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| ForgeError::encode(format!("png: {e}")))?;
        }
        OutputFormat::WebP => {
            let img = src.to_rgba_image()?;
            WebPEncoder::new_lossless(&mut bytes)
                .write_image(
                    img.as_raw(),
                    img.width(),
                    img.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| ForgeError::encode(format!("webp: {e}")))?;
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(flatten_over(src, bg_rgba).to_rgba_image()?)
                .into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| ForgeError::encode(format!("jpeg: {e}")))?;
        }
        OutputFormat::Gif => {
            return encode_gif(std::slice::from_ref(src), 100, quality, bg_rgba);
        }
    }
    Ok(bytes)
}

/// Map a 1..=100 quality knob to the GIF quantizer speed (1 = best, 30 = fastest).
pub fn gif_speed(quality: u8) -> i32 {
    let q = i32::from(quality.clamp(1, 100));
    1 + (100 - q) * 29 / 99
}

/// Encode frames as an infinitely looping GIF, flattening each over `bg_rgba`.
pub fn encode_gif(
    frames: &[Raster],
    delay_ms: u32,
    quality: u8,
    bg_rgba: [u8; 4],
) -> ForgeResult<Vec<u8>> {
    let frames = frames
        .iter()
        .map(|f| gif_frame(f, delay_ms, bg_rgba))
        .collect::<ForgeResult<Vec<_>>>()?;
    encode_gif_frames(frames, quality)
}

pub(crate) fn encode_gif_frames(frames: Vec<image::Frame>, quality: u8) -> ForgeResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, gif_speed(quality));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ForgeError::encode(format!("gif: {e}")))?;
        encoder
            .encode_frames(frames)
            .map_err(|e| ForgeError::encode(format!("gif: {e}")))?;
    }
    Ok(bytes)
}

pub(crate) fn gif_frame(src: &Raster, delay_ms: u32, bg_rgba: [u8; 4]) -> ForgeResult<image::Frame> {
    let img = flatten_over(src, bg_rgba).to_rgba_image()?;
    Ok(image::Frame::from_parts(
        img,
        0,
        0,
        image::Delay::from_numer_denom_ms(delay_ms, 1),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/variant/encode.rs"]
mod tests;
