use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn unpremultiply_inverts_half_alpha_closely() {
    let mut px = vec![200u8, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    let back = unpremultiply_rgba8([px[0], px[1], px[2], px[3]]);
    for (a, b) in back.iter().zip([200u8, 100, 50, 128]) {
        assert!((i32::from(*a) - i32::from(b)).abs() <= 2);
    }
}

#[test]
fn round2_rounds_half_up() {
    assert_eq!(round2(1.234), 1.23);
    assert_eq!(round2(1.235_000_1), 1.24);
    assert_eq!(round2(4.0), 4.0);
}
