use super::*;

#[test]
fn size_parses_and_rejects_zero() {
    assert_eq!("800x1200".parse::<Size>().unwrap(), Size::new(800, 1200));
    assert_eq!(" 10 X 20 ".parse::<Size>().unwrap(), Size::new(10, 20));
    assert!("0x10".parse::<Size>().is_err());
    assert!("800".parse::<Size>().is_err());
}

#[test]
fn rect_scaling_rounds_each_field() {
    let r = PxRect::new(101, 33, 301, 45);
    assert_eq!(r.scaled(1.0, 1.0), r);

    // left 50.5 -> 51, width 150.5 -> 151: rounding is per field, not on the right edge.
    let half = r.scaled(0.5, 0.5);
    assert_eq!(half, PxRect::new(51, 17, 151, 23));
}

#[test]
fn rect_fits_within_bounds() {
    let bounds = Size::new(100, 100);
    assert!(PxRect::new(0, 0, 100, 100).fits_within(bounds));
    assert!(!PxRect::new(1, 0, 100, 100).fits_within(bounds));
    assert!(!PxRect::new(-1, 0, 10, 10).fits_within(bounds));
}

#[test]
fn background_parses_forms() {
    assert_eq!(
        "transparent".parse::<Background>().unwrap(),
        Background::Transparent
    );
    assert_eq!(
        "#ff8000".parse::<Background>().unwrap(),
        Background::Color([255, 128, 0, 255])
    );
    assert_eq!(
        "#10203040".parse::<Background>().unwrap(),
        Background::Color([16, 32, 48, 64])
    );
    assert!("red".parse::<Background>().is_err());
    assert!("#12345".parse::<Background>().is_err());
}

#[test]
fn background_serde_uses_string_form() {
    let json = serde_json::to_string(&Background::Color([1, 2, 3, 4])).unwrap();
    assert_eq!(json, "\"#01020304\"");
    let back: Background = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Background::Color([1, 2, 3, 4]));
}
