use crate::foundation::{
    core::check_dims,
    error::{ForgeError, ForgeResult},
};

/// Output encodings.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossless WebP.
    #[serde(rename = "webp")]
    WebP,
    /// JPEG with a quality knob.
    #[serde(alias = "jpg")]
    Jpeg,
    /// Looping animated GIF.
    Gif,
}

/// Broad output category of an [`OutputFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatCategory {
    /// Pixel-exact still image.
    LosslessRaster,
    /// Still image with a quality knob.
    LossyRaster,
    /// Looping frame sequence.
    AnimatedSequence,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Gif => "gif",
        }
    }

    /// Category of this format.
    pub fn category(self) -> FormatCategory {
        match self {
            OutputFormat::Png | OutputFormat::WebP => FormatCategory::LosslessRaster,
            OutputFormat::Jpeg => FormatCategory::LossyRaster,
            OutputFormat::Gif => FormatCategory::AnimatedSequence,
        }
    }

    /// Whether encoded output keeps the alpha channel. Other formats are flattened
    /// over the background color.
    pub fn keeps_alpha(self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::WebP)
    }
}

/// One requested output of an asset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VariantSpec {
    /// Variant name; also the output directory name.
    pub name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoding.
    pub format: OutputFormat,
    /// Encoder quality 1..=100 (JPEG quality, GIF quantizer effort).
    pub quality: u8,
    /// Render a looping perturbed frame sequence instead of a still.
    pub animated: bool,
    /// Frames in an animated sequence.
    pub frame_count: u32,
    /// Delay between frames in milliseconds; a multiple of 10.
    pub delay_ms: u32,
}

impl Default for VariantSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: 512,
            height: 512,
            format: OutputFormat::Png,
            quality: 90,
            animated: false,
            frame_count: 12,
            delay_ms: 100,
        }
    }
}

impl VariantSpec {
    /// Reject malformed variant requests.
    pub fn validate(&self) -> ForgeResult<()> {
        check_name(&self.name, "variant")?;
        check_dims(&format!("variant '{}'", self.name), self.width, self.height)?;
        check_quality(self.quality)?;
        if self.animated {
            if self.format != OutputFormat::Gif {
                return Err(ForgeError::configuration(format!(
                    "animated variant '{}' must use the gif format",
                    self.name
                )));
            }
            if self.frame_count == 0 {
                return Err(ForgeError::configuration(format!(
                    "animated variant '{}' needs frame_count >= 1",
                    self.name
                )));
            }
            check_delay(self.delay_ms)?;
        }
        Ok(())
    }

    /// Frames this variant produces.
    pub fn frames(&self) -> u32 {
        if self.animated { self.frame_count } else { 1 }
    }
}

/// One encoded output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantBuffer {
    /// Variant name.
    pub name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoding of `bytes`.
    pub format: OutputFormat,
    /// Frames encoded (1 for stills).
    pub frame_count: u32,
    /// Total playback duration (0 for stills).
    pub duration_ms: u64,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

/// Batch-level looping preview settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewSpec {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Delay per asset frame in milliseconds; a multiple of 10.
    pub delay_ms: u32,
    /// Quantizer quality 1..=100.
    pub quality: u8,
    /// Stamp each frame with the asset's token id.
    pub annotate: bool,
}

impl Default for PreviewSpec {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            delay_ms: 500,
            quality: 80,
            annotate: true,
        }
    }
}

impl PreviewSpec {
    /// Reject malformed preview settings.
    pub fn validate(&self) -> ForgeResult<()> {
        check_dims("preview", self.width, self.height)?;
        check_quality(self.quality)?;
        check_delay(self.delay_ms)
    }
}

fn check_name(name: &str, what: &str) -> ForgeResult<()> {
    if name.trim().is_empty() {
        return Err(ForgeError::configuration(format!("{what} name must be non-empty")));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ForgeError::configuration(format!(
            "{what} name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}

fn check_quality(q: u8) -> ForgeResult<()> {
    if !(1..=100).contains(&q) {
        return Err(ForgeError::configuration("quality must be in 1..=100"));
    }
    Ok(())
}

fn check_delay(delay_ms: u32) -> ForgeResult<()> {
    // GIF frame delays are stored in centiseconds.
    if delay_ms == 0 || !delay_ms.is_multiple_of(10) {
        return Err(ForgeError::configuration(
            "delay_ms must be a positive multiple of 10",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/variant/spec.rs"]
mod tests;
