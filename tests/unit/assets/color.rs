use super::*;

#[test]
fn parses_all_hex_forms() {
    assert_eq!(
        parse_hex_color("#FF36C7").unwrap(),
        Rgba8Premul::from_straight_rgba(0xff, 0x36, 0xc7, 255)
    );
    assert_eq!(
        parse_hex_color("ff36c7").unwrap(),
        parse_hex_color("#FF36C7").unwrap()
    );
    assert_eq!(
        parse_hex_color("#0f0").unwrap(),
        Rgba8Premul::from_straight_rgba(0, 255, 0, 255)
    );
    assert_eq!(
        parse_hex_color("#00000080").unwrap(),
        Rgba8Premul::from_straight_rgba(0, 0, 0, 128)
    );
}

#[test]
fn rejects_malformed_colors() {
    for bad in ["", "#", "#12", "#12345", "#GGGGGG", "red", "#ééé"] {
        assert!(parse_hex_color(bad).is_err(), "{bad:?} should fail");
    }
}
