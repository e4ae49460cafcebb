use super::*;
use crate::foundation::core::PatchRect;

fn solid_patch(rect: PatchRect, rgba: [u8; 4], disposal: DisposalMethod) -> Frame {
    Frame {
        patch: rgba
            .iter()
            .copied()
            .cycle()
            .take(rect.width as usize * rect.height as usize * 4)
            .collect(),
        rect,
        delay_cs: 10,
        disposal,
    }
}

fn px(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let off = (y * frame.width + x) as usize * 4;
    frame.data[off..off + 4].try_into().unwrap()
}

#[test]
fn restore_background_clears_exactly_the_patch_rect() {
    let screen = LogicalScreen::new(8, 8).unwrap();
    let mut comp = Compositor::new(screen).unwrap();

    // Full-screen base frame that stays put.
    let base = solid_patch(
        PatchRect {
            left: 0,
            top: 0,
            width: 8,
            height: 8,
        },
        [10, 10, 10, 255],
        DisposalMethod::DoNotDispose,
    );
    comp.push(&base).unwrap();

    // Small patch that clears itself afterwards.
    let overlay_rect = PatchRect {
        left: 2,
        top: 3,
        width: 3,
        height: 2,
    };
    let overlay = solid_patch(overlay_rect, [200, 0, 0, 255], DisposalMethod::RestoreBackground);
    let during = comp.push(&overlay).unwrap();
    assert_eq!(px(&during, 2, 3), [200, 0, 0, 255]);

    // Next snapshot: inside the rect is transparent, outside is untouched.
    let probe = solid_patch(
        PatchRect {
            left: 0,
            top: 0,
            width: 1,
            height: 1,
        },
        [10, 10, 10, 255],
        DisposalMethod::DoNotDispose,
    );
    let after = comp.push(&probe).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            let inside = (2..5).contains(&x) && (3..5).contains(&y);
            if inside {
                assert_eq!(px(&after, x, y), [0, 0, 0, 0], "cleared at {x},{y}");
            } else {
                assert_eq!(px(&after, x, y), [10, 10, 10, 255], "untouched at {x},{y}");
            }
        }
    }
}

#[test]
fn do_not_dispose_accumulates_across_frames() {
    let screen = LogicalScreen::new(4, 1).unwrap();
    let mut comp = Compositor::new(screen).unwrap();

    let left = solid_patch(
        PatchRect {
            left: 0,
            top: 0,
            width: 2,
            height: 1,
        },
        [255, 0, 0, 255],
        DisposalMethod::DoNotDispose,
    );
    comp.push(&left).unwrap();

    let right = solid_patch(
        PatchRect {
            left: 2,
            top: 0,
            width: 2,
            height: 1,
        },
        [0, 255, 0, 255],
        DisposalMethod::DoNotDispose,
    );
    let second = comp.push(&right).unwrap();
    assert_eq!(px(&second, 0, 0), [255, 0, 0, 255]);
    assert_eq!(px(&second, 3, 0), [0, 255, 0, 255]);
}

#[test]
fn restore_previous_degrades_to_do_not_dispose() {
    let screen = LogicalScreen::new(2, 1).unwrap();
    let mut comp = Compositor::new(screen).unwrap();

    let rect = PatchRect {
        left: 0,
        top: 0,
        width: 2,
        height: 1,
    };
    comp.push(&solid_patch(rect, [50, 50, 50, 255], DisposalMethod::RestorePrevious))
        .unwrap();

    // The drawn area must still be present for the next frame.
    let tiny = solid_patch(
        PatchRect {
            left: 0,
            top: 0,
            width: 1,
            height: 1,
        },
        [0, 0, 0, 0],
        DisposalMethod::DoNotDispose,
    );
    let next = comp.push(&tiny).unwrap();
    assert_eq!(px(&next, 1, 0), [50, 50, 50, 255]);
}

#[test]
fn semitransparent_patch_blends_instead_of_overwriting() {
    let screen = LogicalScreen::new(1, 1).unwrap();
    let mut comp = Compositor::new(screen).unwrap();

    let rect = PatchRect {
        left: 0,
        top: 0,
        width: 1,
        height: 1,
    };
    comp.push(&solid_patch(rect, [0, 0, 200, 255], DisposalMethod::DoNotDispose))
        .unwrap();
    let blended = comp
        .push(&solid_patch(rect, [200, 0, 0, 128], DisposalMethod::DoNotDispose))
        .unwrap();

    let got = px(&blended, 0, 0);
    assert_eq!(got[3], 255);
    assert!(got[0] > 80 && got[0] < 120, "red partially applied: {got:?}");
    assert!(got[2] > 80 && got[2] < 120, "blue partially kept: {got:?}");
}

#[test]
fn out_of_bounds_patch_is_a_decode_error() {
    let screen = LogicalScreen::new(4, 4).unwrap();
    let mut comp = Compositor::new(screen).unwrap();
    let bad = solid_patch(
        PatchRect {
            left: 3,
            top: 0,
            width: 2,
            height: 1,
        },
        [0, 0, 0, 255],
        DisposalMethod::None,
    );
    let err = comp.push(&bad).unwrap_err();
    assert!(err.to_string().contains("decode error"));
}

#[test]
fn zero_area_screen_is_rejected_before_any_frame() {
    let screen = LogicalScreen {
        width: 0,
        height: 4,
    };
    assert!(Compositor::new(screen).is_err());
}
