use super::*;

#[test]
fn fnv_incremental_matches_single_write() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"drape");
    a.write_u32(7);

    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"dr");
    b.write_bytes(b"ape");
    b.write_bytes(&7u32.to_le_bytes());
    assert_eq!(a.finish(), b.finish());
}

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
    let mut px = [200u8, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [0, 0, 0, 0]);
}

#[test]
fn unpremultiply_restores_opaque_and_half_alpha() {
    let mut opaque = [10u8, 20, 30, 255];
    unpremultiply_rgba8_in_place(&mut opaque);
    assert_eq!(opaque, [10, 20, 30, 255]);

    let mut half = [100u8, 50, 200, 128];
    premultiply_rgba8_in_place(&mut half);
    unpremultiply_rgba8_in_place(&mut half);
    for (got, want) in half.iter().zip([100u8, 50, 200, 128]) {
        assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
    }
}
