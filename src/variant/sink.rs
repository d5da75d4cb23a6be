use crate::{
    foundation::{
        core::Raster,
        error::{ForgeError, ForgeResult},
    },
    variant::encode::{encode_gif_frames, gif_frame},
};

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Delay after each frame in milliseconds.
    pub delay_ms: u32,
}

/// Consumer of rendered frames, fed in order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ForgeResult<()>;
    /// Push the next frame. Frames must match the configured size.
    fn push_frame(&mut self, frame: &Raster) -> ForgeResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> ForgeResult<()>;
}

/// Collects frames in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Raster>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[Raster] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ForgeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &Raster) -> ForgeResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> ForgeResult<()> {
        Ok(())
    }
}

/// Collects frames for an infinitely looping GIF, encoded in memory on [`FrameSink::end`].
pub struct GifSink {
    quality: u8,
    bg_rgba: [u8; 4],
    cfg: Option<SinkConfig>,
    frames: Vec<image::Frame>,
    bytes: Option<Vec<u8>>,
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("quality", &self.quality)
            .field("cfg", &self.cfg)
            .field("frames", &self.frames.len())
            .finish_non_exhaustive()
    }
}

impl GifSink {
    /// New sink; frames are flattened over `bg_rgba`.
    pub fn new(quality: u8, bg_rgba: [u8; 4]) -> Self {
        Self {
            quality,
            bg_rgba,
            cfg: None,
            frames: Vec::new(),
            bytes: None,
        }
    }

    /// Frames pushed so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Encoded bytes; available after [`FrameSink::end`].
    pub fn into_bytes(self) -> ForgeResult<Vec<u8>> {
        self.bytes
            .ok_or_else(|| ForgeError::encode("gif sink was not finished"))
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> ForgeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.bytes = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Raster) -> ForgeResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(ForgeError::encode("gif sink used before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ForgeError::encode(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames
            .push(gif_frame(frame, cfg.delay_ms, self.bg_rgba)?);
        Ok(())
    }

    fn end(&mut self) -> ForgeResult<()> {
        if self.cfg.is_none() {
            return Err(ForgeError::encode("gif sink used before begin"));
        }
        let frames = std::mem::take(&mut self.frames);
        self.bytes = Some(encode_gif_frames(frames, self.quality)?);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variant/sink.rs"]
mod tests;
