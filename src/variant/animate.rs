use crate::{
    foundation::error::{ForgeError, ForgeResult},
    render::{
        backend::CompositeJob,
        compositor::{Compositor, Perturbation, perturb_job},
    },
    variant::{
        encode::cover_fit,
        sink::{FrameSink, SinkConfig},
        spec::VariantSpec,
    },
};

/// Amplitudes of the periodic per-frame perturbation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    /// Peak rotation in degrees.
    pub rotation_deg: f64,
    /// Peak relative scale change.
    pub scale_amp: f64,
    /// Peak opacity reduction.
    pub opacity_amp: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            rotation_deg: 3.0,
            scale_amp: 0.03,
            opacity_amp: 0.15,
        }
    }
}

impl AnimationParams {
    /// Reject amplitudes that would flip or erase layers.
    pub fn validate(&self) -> ForgeResult<()> {
        if !self.rotation_deg.is_finite() {
            return Err(ForgeError::configuration("rotation_deg must be finite"));
        }
        if !self.scale_amp.is_finite() || !(0.0..1.0).contains(&self.scale_amp) {
            return Err(ForgeError::configuration("scale_amp must be in [0, 1)"));
        }
        if !self.opacity_amp.is_finite() || !(0.0..=1.0).contains(&self.opacity_amp) {
            return Err(ForgeError::configuration("opacity_amp must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Perturbation for frame `index` of a loop of `frame_count` frames.
pub fn frame_perturbation(index: u32, frame_count: u32, params: &AnimationParams) -> Perturbation {
    if frame_count == 0 {
        return Perturbation::identity();
    }
    let phase = (std::f64::consts::TAU * f64::from(index) / f64::from(frame_count)).sin();
    Perturbation {
        rotation_rad: (params.rotation_deg * phase).to_radians(),
        scale: 1.0 + params.scale_amp * phase,
        opacity: 1.0 - params.opacity_amp * phase.abs() as f32,
    }
}

/// Re-composite `job` once per frame with the periodic perturbation, cover-fit each frame
/// to the variant size, and push it into `sink`.
#[tracing::instrument(level = "debug", skip_all, fields(variant = %spec.name, frames = spec.frame_count))]
pub fn render_frames(
    compositor: &Compositor,
    job: &CompositeJob,
    spec: &VariantSpec,
    params: &AnimationParams,
    sink: &mut dyn FrameSink,
) -> ForgeResult<()> {
    let frame_count = spec.frames();
    sink.begin(SinkConfig {
        width: spec.width,
        height: spec.height,
        delay_ms: spec.delay_ms,
    })?;
    for i in 0..frame_count {
        let frame_job = perturb_job(job, frame_perturbation(i, frame_count, params));
        let outcome = compositor.composite(&frame_job)?;
        if outcome.is_degraded() {
            tracing::warn!(frame = i, "animated frame used the degraded fallback");
        }
        sink.push_frame(&cover_fit(&outcome.raster, spec.width, spec.height)?)?;
    }
    sink.end()
}

#[cfg(test)]
#[path = "../../tests/unit/variant/animate.rs"]
mod tests;
