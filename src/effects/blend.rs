use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// How a layer combines with what is already on the canvas.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Multiply colors.
    Multiply,
    /// Inverse multiply of inverses.
    Screen,
    /// Multiply or screen depending on the backdrop.
    Overlay,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
    /// Additive (plus-lighter), saturating.
    Add,
}

impl BlendMode {
    /// Lowercase name as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::Add => "add",
        }
    }
}

/// Source-over with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite `src` onto `dst` with `mode` and an opacity multiplier.
pub fn blend(dst: PremulRgba8, src: PremulRgba8, opacity: f32, mode: BlendMode) -> PremulRgba8 {
    if mode == BlendMode::Normal {
        return over(dst, src, opacity);
    }
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let sa = f32::from(src[3]) / 255.0 * opacity;
    let da = f32::from(dst[3]) / 255.0;
    let mut out = [0u8; 4];

    if mode == BlendMode::Add {
        for i in 0..3 {
            let sc = f32::from(src[i]) / 255.0 * opacity;
            let dc = f32::from(dst[i]) / 255.0;
            out[i] = to_u8(sc + dc);
        }
        out[3] = to_u8(sa + da);
        return out;
    }

    for i in 0..3 {
        let sc = f32::from(src[i]) / 255.0 * opacity;
        let dc = f32::from(dst[i]) / 255.0;
        let cs = if sa > 0.0 { (sc / sa).min(1.0) } else { 0.0 };
        let cb = if da > 0.0 { (dc / da).min(1.0) } else { 0.0 };
        let mixed = mix_channel(mode, cb, cs);
        out[i] = to_u8(sc * (1.0 - da) + dc * (1.0 - sa) + sa * da * mixed);
    }
    out[3] = to_u8(sa + da * (1.0 - sa));
    out
}

fn mix_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::Normal | BlendMode::Add => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Overlay => {
            if cb <= 0.5 {
                2.0 * cb * cs
            } else {
                1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
            }
        }
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
