use anyhow::Context;

use crate::foundation::{
    core::{Canvas, Raster},
    error::{ForgeError, ForgeResult},
};

/// Decode trait source bytes into a premultiplied raster.
///
/// SVG sources (by extension or sniffed markup) are rasterized at `canvas` size; everything else
/// goes through the `image` decoders at native size.
pub fn decode_trait(bytes: &[u8], file_name: &str, canvas: Canvas) -> ForgeResult<Raster> {
    if is_svg(bytes, file_name) {
        let tree = parse_svg(bytes)?;
        return rasterize_svg(&tree, canvas.width, canvas.height);
    }
    decode_image(bytes)
}

/// Decode a raster image (PNG, JPEG, WebP, GIF, BMP) from memory.
pub fn decode_image(bytes: &[u8]) -> ForgeResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| ForgeError::decode(format!("{e:#}")))?;
    Ok(Raster::from_rgba_image(dyn_img.to_rgba8()))
}

/// Parse SVG markup into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> ForgeResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts).map_err(|e| ForgeError::decode(format!("parse svg tree: {e}")))
}

/// Rasterize a parsed SVG, stretched to `width` x `height`.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> ForgeResult<Raster> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ForgeError::decode("failed to allocate svg pixmap"))?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(ForgeError::decode("svg has invalid width/height"));
    }
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Raster::from_premul(width, height, pixmap.data().to_vec())
}

fn is_svg(bytes: &[u8], file_name: &str) -> bool {
    if file_name.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
