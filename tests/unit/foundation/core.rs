use super::*;

#[test]
fn logical_screen_rejects_zero_area() {
    assert!(LogicalScreen::new(0, 10).is_err());
    assert!(LogicalScreen::new(10, 0).is_err());
    let screen = LogicalScreen::new(3, 4).unwrap();
    assert_eq!(screen.area(), 12);
}

#[test]
fn patch_rect_fits_boundaries() {
    let screen = LogicalScreen::new(10, 10).unwrap();
    let inside = PatchRect {
        left: 2,
        top: 2,
        width: 8,
        height: 8,
    };
    assert!(inside.fits(screen));

    let overhang = PatchRect {
        left: 3,
        top: 0,
        width: 8,
        height: 8,
    };
    assert!(!overhang.fits(screen));
}

#[test]
fn frame_rgba_to_rgb_drops_alpha() {
    let frame = FrameRgba {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 255, 4, 5, 6, 0],
    };
    assert_eq!(frame.to_rgb(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn rgb_hex_parsing() {
    assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb::new(255, 128, 0));
    assert_eq!(Rgb::from_hex("000000").unwrap(), Rgb::new(0, 0, 0));
    assert!(Rgb::from_hex("#fff").is_err());
    assert!(Rgb::from_hex("zzzzzz").is_err());
}
