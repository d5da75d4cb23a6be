use super::*;
use image::GenericImageView as _;

use crate::foundation::core::{MAX_DIM, Rgba8Premul};

fn split_raster(w: u32, h: u32) -> Raster {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _y in 0..h {
        for x in 0..w {
            if x < w / 2 {
                data.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
    }
    Raster::from_premul(w, h, data).unwrap()
}

#[test]
fn cover_fit_crops_symmetrically() {
    let src = split_raster(100, 50);
    let out = cover_fit(&src, 50, 50).unwrap();
    assert_eq!((out.width, out.height), (50, 50));
    let left = out.pixel(5, 25);
    let right = out.pixel(45, 25);
    assert!(left[0] > 200 && left[2] < 50, "{left:?}");
    assert!(right[2] > 200 && right[0] < 50, "{right:?}");
}

#[test]
fn cover_fit_upscales_to_exact_size() {
    let src = split_raster(4, 4);
    let out = cover_fit(&src, 37, 21).unwrap();
    assert_eq!((out.width, out.height), (37, 21));
    assert!(out.data.chunks_exact(4).all(|p| p[0] <= p[3] && p[2] <= p[3]));
}

#[test]
fn cover_fit_handles_extreme_aspect_pairs() {
    let color = Rgba8Premul::from_straight_rgba(40, 120, 200, 255);
    let pairs = [
        ((MAX_DIM, 1), (1, MAX_DIM)),
        ((1, MAX_DIM), (MAX_DIM, 1)),
        ((512, 512), (MAX_DIM, 64)),
        ((512, 512), (64, MAX_DIM)),
        ((3, 1), (1, 3)),
    ];
    for ((sw, sh), (tw, th)) in pairs {
        let src = Raster::filled(sw, sh, color).unwrap();
        let out = cover_fit(&src, tw, th).unwrap();
        assert_eq!((out.width, out.height), (tw, th), "{sw}x{sh} -> {tw}x{th}");
        let px = out.pixel(tw / 2, th / 2);
        assert_eq!(px[3], 255, "{sw}x{sh} -> {tw}x{th}: {px:?}");
        assert!(px[2].abs_diff(200) <= 2, "{sw}x{sh} -> {tw}x{th}: {px:?}");
    }
}

#[test]
fn cover_crop_keeps_target_aspect_centered() {
    assert_eq!(cover_crop(100, 50, 50, 50), (25, 0, 50, 50));
    assert_eq!(cover_crop(50, 100, 100, 50), (0, 37, 50, 25));
    assert_eq!(cover_crop(MAX_DIM, 1, 1, MAX_DIM), ((MAX_DIM - 1) / 2, 0, 1, 1));
    assert_eq!(cover_crop(4, 4, 37, 21), (0, 1, 4, 2));
}

#[test]
fn flatten_over_fills_transparency() {
    let src = Raster::from_premul(2, 1, vec![0, 0, 0, 0, 100, 0, 0, 128]).unwrap();
    let out = flatten_over(&src, [10, 20, 30, 255]);
    assert_eq!(out.pixel(0, 0), [10, 20, 30, 255]);
    let p = out.pixel(1, 0);
    assert_eq!(p[3], 255);
    assert_eq!(p[0], 105);
}

#[test]
fn stills_decode_at_requested_size() {
    let src = split_raster(16, 8);
    for format in [OutputFormat::Png, OutputFormat::WebP, OutputFormat::Jpeg] {
        let bytes = encode_still(&src, format, 80, [0, 0, 0, 255]).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), (16, 8), "{format:?}");
    }
}

#[test]
fn png_keeps_alpha() {
    let src = Raster::from_premul(1, 1, vec![0, 0, 0, 0]).unwrap();
    let bytes = encode_still(&src, OutputFormat::Png, 90, [255, 255, 255, 255]).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().into_rgba8();
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
}

#[test]
fn gif_speed_spans_quantizer_range() {
    assert_eq!(gif_speed(100), 1);
    assert_eq!(gif_speed(1), 30);
    assert!(gif_speed(50) > 1 && gif_speed(50) < 30);
}

#[test]
fn gif_encodes_every_frame() {
    use image::AnimationDecoder as _;

    let frames = vec![split_raster(8, 8), split_raster(8, 8), split_raster(8, 8)];
    let bytes = encode_gif(&frames, 70, 90, [0, 0, 0, 255]).unwrap();
    let decoded = image::codecs::gif::GifDecoder::new(std::io::Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(decoded.len(), 3);
    let (n, d) = decoded[0].delay().numer_denom_ms();
    assert_eq!(n / d, 70);
}
