use std::collections::BTreeMap;

use crate::{
    catalog::model::LayerCatalog,
    effects::{blend::BlendMode, fx::LayerEffects},
    foundation::{
        core::Canvas,
        error::{ForgeError, ForgeResult},
    },
    variant::spec::OutputFormat,
};

/// Where and how one layer lands on the canvas.
///
/// The layer's raster is stretched to the canvas rectangle, scaled about the canvas
/// center by `scale`, then offset by `(x, y)` pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerPlacement {
    /// Horizontal offset in canvas pixels.
    pub x: f64,
    /// Vertical offset in canvas pixels.
    pub y: f64,
    /// Uniform scale about the canvas center.
    pub scale: f64,
    /// Layer opacity, multiplied with the global opacity.
    pub opacity: f32,
    /// Overrides the global blend mode for this layer.
    pub blend: Option<BlendMode>,
}

impl Default for LayerPlacement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            opacity: 1.0,
            blend: None,
        }
    }
}

impl LayerPlacement {
    fn validate(&self, layer: &str) -> ForgeResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ForgeError::configuration(format!(
                "placement for layer '{layer}' has a non-finite offset"
            )));
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(ForgeError::configuration(format!(
                "placement scale for layer '{layer}' must be finite and >= 0"
            )));
        }
        check_opacity(self.opacity, &format!("placement opacity for layer '{layer}'"))
    }
}

/// Compositing options for a generation run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositeOptions {
    /// Output canvas size.
    pub canvas: Canvas,
    /// Background color (straight RGBA). Transparent by default.
    pub background: [u8; 4],
    /// Global blend mode, used by layers without an override.
    pub blend: BlendMode,
    /// Global opacity, multiplied into every layer.
    pub opacity: f32,
    /// Per-layer placement, keyed by layer name.
    pub placements: BTreeMap<String, LayerPlacement>,
    /// Per-layer effects, keyed by layer name.
    pub effects: BTreeMap<String, LayerEffects>,
    /// Encoding for the full-size composite when exported.
    pub format: OutputFormat,
    /// Encoder quality 1..=100.
    pub quality: u8,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            background: [0, 0, 0, 0],
            blend: BlendMode::Normal,
            opacity: 1.0,
            placements: BTreeMap::new(),
            effects: BTreeMap::new(),
            format: OutputFormat::Png,
            quality: 90,
        }
    }
}

impl CompositeOptions {
    /// Check ranges and that every keyed layer exists in `catalog`.
    pub fn validate(&self, catalog: &LayerCatalog) -> ForgeResult<()> {
        self.canvas.validate()?;
        check_opacity(self.opacity, "global opacity")?;
        if !(1..=100).contains(&self.quality) {
            return Err(ForgeError::configuration("quality must be in 1..=100"));
        }
        if self.format == OutputFormat::Gif {
            return Err(ForgeError::configuration(
                "gif is only available for animated variants",
            ));
        }
        let known = |name: &str| catalog.layers().iter().any(|l| l.name == name);
        for (layer, placement) in &self.placements {
            if !known(layer) {
                return Err(ForgeError::configuration(format!(
                    "placement names unknown layer '{layer}'"
                )));
            }
            placement.validate(layer)?;
        }
        for (layer, fx) in &self.effects {
            if !known(layer) {
                return Err(ForgeError::configuration(format!(
                    "effects name unknown layer '{layer}'"
                )));
            }
            fx.validate()?;
        }
        Ok(())
    }

    /// Placement for `layer`, falling back to the default full-canvas placement.
    pub fn placement(&self, layer: &str) -> LayerPlacement {
        self.placements.get(layer).copied().unwrap_or_default()
    }

    /// Effects for `layer`, falling back to none.
    pub fn effects_for(&self, layer: &str) -> LayerEffects {
        self.effects.get(layer).copied().unwrap_or_default()
    }
}

fn check_opacity(v: f32, what: &str) -> ForgeResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(ForgeError::configuration(format!("{what} must be in [0, 1]")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/options.rs"]
mod tests;
