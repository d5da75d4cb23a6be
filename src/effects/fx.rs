use std::sync::Arc;

use crate::{
    effects::blur::blur_raster,
    foundation::{
        core::Raster,
        error::{ForgeError, ForgeResult},
        math::unpremultiply_rgba8,
    },
};

/// Largest accepted blur radius in pixels.
pub const MAX_BLUR_RADIUS: u32 = 256;

/// Per-layer visual effects, applied to a trait raster before it is placed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerEffects {
    /// Gaussian blur radius in pixels (0 disables).
    pub blur: u32,
    /// Brightness multiplier (1 = unchanged).
    pub brightness: f32,
    /// Contrast multiplier around mid-grey (1 = unchanged).
    pub contrast: f32,
}

impl Default for LayerEffects {
    fn default() -> Self {
        Self {
            blur: 0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

impl LayerEffects {
    /// Reject out-of-range parameters.
    pub fn validate(&self) -> ForgeResult<()> {
        if self.blur > MAX_BLUR_RADIUS {
            return Err(ForgeError::configuration(format!(
                "blur radius must be <= {MAX_BLUR_RADIUS}"
            )));
        }
        if !self.brightness.is_finite() || self.brightness < 0.0 {
            return Err(ForgeError::configuration(
                "brightness must be finite and >= 0",
            ));
        }
        if !self.contrast.is_finite() || self.contrast < 0.0 {
            return Err(ForgeError::configuration(
                "contrast must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Whether applying these effects would leave a raster unchanged.
    pub fn is_identity(&self) -> bool {
        self.blur == 0 && self.brightness == 1.0 && self.contrast == 1.0
    }
}

/// Apply `fx` to `src`. Identity effects hand back the same allocation.
pub fn apply_effects(src: &Arc<Raster>, fx: &LayerEffects) -> ForgeResult<Arc<Raster>> {
    if fx.is_identity() {
        return Ok(Arc::clone(src));
    }

    let mut out = if fx.blur > 0 {
        blur_raster(src, fx.blur, fx.blur as f32 / 2.0)?
    } else {
        src.as_ref().clone()
    };

    if fx.brightness != 1.0 || fx.contrast != 1.0 {
        adjust_tone(&mut out, fx.brightness, fx.contrast);
    }
    Ok(Arc::new(out))
}

fn adjust_tone(raster: &mut Raster, brightness: f32, contrast: f32) {
    for px in raster.data.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        let straight = unpremultiply_rgba8([px[0], px[1], px[2], a]);
        let af = f32::from(a) / 255.0;
        for c in 0..3 {
            let v = f32::from(straight[c]) / 255.0 * brightness;
            let v = ((v - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
            px[c] = (v * af * 255.0).round() as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/fx.rs"]
mod tests;
