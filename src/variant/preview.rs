use crate::{
    foundation::{
        core::Raster,
        error::{ForgeError, ForgeResult},
    },
    variant::{
        encode::cover_fit,
        sink::{FrameSink, GifSink, SinkConfig},
        spec::{OutputFormat, PreviewSpec, VariantBuffer},
    },
};

/// Name given to the preview [`VariantBuffer`].
pub const PREVIEW_NAME: &str = "preview";

// 3x5 bitmap digits; each row is a 3-bit mask, MSB on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Encode one looping frame per asset, in the order given.
#[tracing::instrument(level = "debug", skip_all, fields(frames = frames.len()))]
pub fn render_preview(
    frames: &[(u64, &Raster)],
    spec: &PreviewSpec,
    bg_rgba: [u8; 4],
) -> ForgeResult<VariantBuffer> {
    spec.validate()?;
    if frames.is_empty() {
        return Err(ForgeError::configuration(
            "collection preview needs at least one asset",
        ));
    }

    let mut sink = GifSink::new(spec.quality, bg_rgba);
    sink.begin(SinkConfig {
        width: spec.width,
        height: spec.height,
        delay_ms: spec.delay_ms,
    })?;
    for (token_id, raster) in frames {
        let mut frame = cover_fit(raster, spec.width, spec.height)?;
        if spec.annotate {
            stamp_number(&mut frame, *token_id);
        }
        sink.push_frame(&frame)?;
    }
    sink.end()?;

    let frame_count = u32::try_from(frames.len())
        .map_err(|_| ForgeError::configuration("too many preview frames"))?;
    Ok(VariantBuffer {
        name: PREVIEW_NAME.to_string(),
        width: spec.width,
        height: spec.height,
        format: OutputFormat::Gif,
        frame_count,
        duration_ms: u64::from(frame_count) * u64::from(spec.delay_ms),
        bytes: sink.into_bytes()?,
    })
}

/// Draw `n` in white digits on a black plate at the top-left corner.
pub fn stamp_number(raster: &mut Raster, n: u64) {
    let digits: Vec<usize> = n
        .to_string()
        .bytes()
        .map(|b| usize::from(b - b'0'))
        .collect();
    let scale = (raster.width.min(raster.height) / 64).max(1);
    let glyph_w = 3 * scale;
    let advance = glyph_w + scale;
    let plate_w = advance * digits.len() as u32 + scale;
    let plate_h = 5 * scale + 2 * scale;

    fill_rect(raster, scale, scale, plate_w, plate_h, [0, 0, 0, 255]);

    let top = 2 * scale;
    for (i, &d) in digits.iter().enumerate() {
        let left = 2 * scale + advance * i as u32;
        for (row, bits) in DIGITS[d].iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) != 0 {
                    fill_rect(
                        raster,
                        left + col * scale,
                        top + row as u32 * scale,
                        scale,
                        scale,
                        [255, 255, 255, 255],
                    );
                }
            }
        }
    }
}

fn fill_rect(raster: &mut Raster, x: u32, y: u32, w: u32, h: u32, px: [u8; 4]) {
    let x1 = x.saturating_add(w).min(raster.width);
    let y1 = y.saturating_add(h).min(raster.height);
    let stride = raster.width as usize * 4;
    for yy in y.min(y1)..y1 {
        for xx in x.min(x1)..x1 {
            let i = yy as usize * stride + xx as usize * 4;
            raster.data[i..i + 4].copy_from_slice(&px);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variant/preview.rs"]
mod tests;
