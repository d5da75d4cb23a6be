use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn multiply_with_white_backdrop_is_source() {
    let dst = [255, 255, 255, 255];
    let src = [100, 50, 25, 255];
    assert_eq!(blend(dst, src, 1.0, BlendMode::Multiply), src);
}

#[test]
fn screen_with_black_backdrop_is_source() {
    let dst = [0, 0, 0, 255];
    let src = [100, 50, 25, 255];
    assert_eq!(blend(dst, src, 1.0, BlendMode::Screen), src);
}

#[test]
fn darken_and_lighten_pick_extremes() {
    let dst = [200, 20, 100, 255];
    let src = [50, 220, 100, 255];
    assert_eq!(blend(dst, src, 1.0, BlendMode::Darken), [50, 20, 100, 255]);
    assert_eq!(blend(dst, src, 1.0, BlendMode::Lighten), [200, 220, 100, 255]);
}

#[test]
fn add_saturates() {
    let dst = [200, 10, 0, 255];
    let src = [100, 10, 0, 255];
    assert_eq!(blend(dst, src, 1.0, BlendMode::Add), [255, 20, 0, 255]);
}

#[test]
fn non_normal_modes_respect_zero_opacity() {
    let dst = [9, 8, 7, 255];
    for mode in [
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Add,
    ] {
        assert_eq!(blend(dst, [255, 255, 255, 255], 0.0, mode), dst);
    }
}

#[test]
fn blend_mode_serde_is_lowercase() {
    let m: BlendMode = serde_json::from_str("\"overlay\"").unwrap();
    assert_eq!(m, BlendMode::Overlay);
    assert_eq!(serde_json::to_string(&BlendMode::Add).unwrap(), "\"add\"");
    assert_eq!(BlendMode::Multiply.as_str(), "multiply");
}
