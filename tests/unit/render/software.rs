use std::sync::Arc;

use super::*;
use crate::effects::blend::BlendMode;
use crate::foundation::core::{Affine, Canvas};

fn canvas4() -> Canvas {
    Canvas {
        width: 4,
        height: 4,
    }
}

fn draw(px: [u8; 4], transform: Affine, opacity: f32, blend: BlendMode) -> LayerDraw {
    LayerDraw {
        layer: "l".to_string(),
        raster: Arc::new(Raster::from_premul(4, 4, px.repeat(16)).unwrap()),
        transform,
        opacity,
        blend,
    }
}

#[test]
fn identity_placement_copies_pixels() {
    let job = CompositeJob {
        canvas: canvas4(),
        background_rgba: [0, 0, 0, 0],
        layers: vec![draw([10, 20, 30, 255], Affine::IDENTITY, 1.0, BlendMode::Normal)],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    assert!(out.data.chunks_exact(4).all(|p| p == [10, 20, 30, 255]));
}

#[test]
fn multiply_over_white_keeps_layer_color() {
    let job = CompositeJob {
        canvas: canvas4(),
        background_rgba: [255, 255, 255, 255],
        layers: vec![draw([128, 0, 0, 255], Affine::IDENTITY, 1.0, BlendMode::Multiply)],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    assert_eq!(out.pixel(2, 2), [128, 0, 0, 255]);
}

#[test]
fn scaled_layer_leaves_background_at_corners() {
    let t = Affine::translate((1.0, 1.0)) * Affine::scale(0.5);
    let job = CompositeJob {
        canvas: canvas4(),
        background_rgba: [0, 0, 255, 255],
        layers: vec![draw([255, 0, 0, 255], t, 1.0, BlendMode::Normal)],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 255, 255]);
    assert_eq!(out.pixel(3, 3), [0, 0, 255, 255]);
    assert_eq!(out.pixel(1, 1)[0], 255);
}

#[test]
fn zero_opacity_and_zero_scale_draw_nothing() {
    let job = CompositeJob {
        canvas: canvas4(),
        background_rgba: [0, 0, 0, 0],
        layers: vec![
            draw([255, 0, 0, 255], Affine::IDENTITY, 0.0, BlendMode::Normal),
            draw([255, 0, 0, 255], Affine::scale(0.0), 1.0, BlendMode::Normal),
        ],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    assert!(out.data.iter().all(|&b| b == 0));
}

#[test]
fn half_opacity_blends_with_background() {
    let job = CompositeJob {
        canvas: canvas4(),
        background_rgba: [0, 0, 0, 255],
        layers: vec![draw([255, 255, 255, 255], Affine::IDENTITY, 0.5, BlendMode::Normal)],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    let px = out.pixel(0, 0);
    assert!((127..=129).contains(&px[0]), "{px:?}");
    assert_eq!(px[3], 255);
}

fn solid_layer(w: u32, h: u32, px: [u8; 4], transform: Affine, blend: BlendMode) -> LayerDraw {
    LayerDraw {
        layer: "l".to_string(),
        raster: Arc::new(Raster::from_premul(w, h, px.repeat((w * h) as usize)).unwrap()),
        transform,
        opacity: 1.0,
        blend,
    }
}

#[test]
fn upscaled_full_canvas_layers_stay_opaque_to_the_corners() {
    let job = CompositeJob {
        canvas: Canvas {
            width: 24,
            height: 24,
        },
        background_rgba: [0, 0, 0, 0],
        layers: vec![
            solid_layer(8, 8, [255, 0, 0, 255], Affine::scale(3.0), BlendMode::Normal),
            solid_layer(8, 8, [128, 128, 128, 255], Affine::scale(3.0), BlendMode::Multiply),
        ],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    let center = out.pixel(12, 12);
    assert_eq!(center, [128, 0, 0, 255]);
    for (x, y) in [(0, 0), (23, 0), (0, 23), (23, 23)] {
        assert_eq!(out.pixel(x, y), center, "corner ({x}, {y})");
    }
    assert!(out.data.chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn upscaled_edges_repeat_the_border_texels() {
    let raster = Raster::from_premul(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
    let job = CompositeJob {
        canvas: Canvas {
            width: 8,
            height: 4,
        },
        background_rgba: [0, 0, 0, 0],
        layers: vec![LayerDraw {
            layer: "l".to_string(),
            raster: Arc::new(raster),
            transform: Affine::scale_non_uniform(4.0, 4.0),
            opacity: 1.0,
            blend: BlendMode::Normal,
        }],
    };
    let out = SoftwareBackend::new().composite(&job).unwrap();
    assert_eq!(out.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(out.pixel(0, 3), [255, 0, 0, 255]);
    assert_eq!(out.pixel(7, 0), [0, 0, 255, 255]);
    assert_eq!(out.pixel(7, 3), [0, 0, 255, 255]);
}

#[test]
fn normal_blend_matches_the_vello_backend() {
    let mut overlay = solid_layer(
        4,
        4,
        [0, 0, 100, 160],
        Affine::translate((6.0, 6.0)) * Affine::scale(2.0),
        BlendMode::Normal,
    );
    overlay.opacity = 0.5;
    let job = CompositeJob {
        canvas: Canvas {
            width: 24,
            height: 24,
        },
        background_rgba: [0, 0, 0, 0],
        layers: vec![
            solid_layer(8, 8, [255, 0, 0, 255], Affine::scale(3.0), BlendMode::Normal),
            overlay,
        ],
    };
    let soft = SoftwareBackend::new().composite(&job).unwrap();
    let vello = crate::render::vello::VelloCpuBackend::new()
        .composite(&job)
        .unwrap();

    let max_diff = soft
        .data
        .iter()
        .zip(&vello.data)
        .map(|(a, b)| a.abs_diff(*b))
        .max()
        .unwrap();
    assert!(max_diff <= 4, "max channel difference {max_diff}");
    assert_eq!(soft.pixel(0, 0), [255, 0, 0, 255]);
}
