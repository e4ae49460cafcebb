use super::*;

fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> FrameRgba {
    FrameRgba {
        width,
        height,
        data: rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect(),
    }
}

fn checker_frame(width: u32, height: u32) -> FrameRgba {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 2 == 0 {
                data.extend_from_slice(&[230, 230, 230, 255]);
            } else {
                data.extend_from_slice(&[20, 20, 60, 255]);
            }
        }
    }
    FrameRgba {
        width,
        height,
        data,
    }
}

/// Walk the produced stream and return the offsets of every extension
/// introducer / image separator pair, validating overall structure.
fn structure_check(bytes: &[u8]) -> (usize, usize) {
    assert_eq!(&bytes[..6], b"GIF89a");
    assert_eq!(*bytes.last().unwrap(), 0x3B);

    // Logical screen descriptor + 256-entry global table.
    let packed = bytes[10];
    assert_eq!(packed & 0x80, 0x80, "global color table flag");
    assert_eq!(packed & 0x07, 0x07, "256-entry table");
    let mut pos = 13 + 768;

    // Optional Netscape block.
    if bytes[pos] == 0x21 && bytes[pos + 1] == 0xFF {
        assert_eq!(bytes[pos + 2], 0x0B);
        assert_eq!(&bytes[pos + 3..pos + 14], b"NETSCAPE2.0");
        pos += 14 + 4 + 1;
    }

    let mut gce_count = 0;
    let mut image_count = 0;
    while pos < bytes.len() - 1 {
        assert_eq!(bytes[pos], 0x21, "graphic control extension expected");
        assert_eq!(bytes[pos + 1], 0xF9);
        assert_eq!(bytes[pos + 2], 0x04);
        gce_count += 1;
        pos += 3 + 4 + 1;

        assert_eq!(bytes[pos], 0x2C, "image descriptor follows its GCE");
        image_count += 1;
        let packed = bytes[pos + 9];
        assert_eq!(packed & 0x80, 0, "no local color table");
        pos += 10;

        pos += 1; // LZW minimum code size
        loop {
            let len = bytes[pos] as usize;
            pos += 1;
            if len == 0 {
                break;
            }
            pos += len;
        }
    }
    assert_eq!(pos, bytes.len() - 1, "exactly one trailer byte after data");
    (gce_count, image_count)
}

#[test]
fn stream_structure_single_frame() {
    let mut enc = Gif89aEncoder::new(16, 16, GifOptions::default()).unwrap();
    enc.add_frame(&checker_frame(16, 16), 5).unwrap();
    let bytes = enc.finish().unwrap();
    let (gce, images) = structure_check(&bytes);
    assert_eq!((gce, images), (1, 1));
}

#[test]
fn stream_structure_three_frames_one_global_table() {
    let mut enc = Gif89aEncoder::new(12, 8, GifOptions::default()).unwrap();
    for shade in [40u8, 140, 240] {
        enc.add_frame(&solid_frame(12, 8, [shade, shade, shade, 255]), 10)
            .unwrap();
    }
    let bytes = enc.finish().unwrap();
    let (gce, images) = structure_check(&bytes);
    assert_eq!((gce, images), (3, 3));
}

#[test]
fn no_repeat_skips_netscape_block() {
    let opts = GifOptions {
        repeat: None,
        ..GifOptions::default()
    };
    let mut enc = Gif89aEncoder::new(8, 8, GifOptions::default()).unwrap();
    enc.add_frame(&checker_frame(8, 8), 4).unwrap();
    let with_loop = enc.finish().unwrap();

    let mut enc = Gif89aEncoder::new(8, 8, opts).unwrap();
    enc.add_frame(&checker_frame(8, 8), 4).unwrap();
    let without_loop = enc.finish().unwrap();

    let has_netscape = |b: &[u8]| b.windows(11).any(|w| w == b"NETSCAPE2.0");
    assert!(has_netscape(&with_loop));
    assert!(!has_netscape(&without_loop));
}

#[test]
fn delay_is_written_in_centiseconds() {
    let mut enc = Gif89aEncoder::new(8, 8, GifOptions::default()).unwrap();
    enc.add_frame(&checker_frame(8, 8), 12).unwrap();
    let bytes = enc.finish().unwrap();

    // First GCE after header + LSD + global table + netscape block.
    let pos = 13 + 768 + 19;
    assert_eq!(&bytes[pos..pos + 3], &[0x21, 0xF9, 0x04]);
    let delay = u16::from_le_bytes([bytes[pos + 4], bytes[pos + 5]]);
    assert_eq!(delay, 12);
}

#[test]
fn solid_color_frame_encodes_without_hanging() {
    // The flat-color fixup path: must terminate and still contain the color.
    let mut enc = Gif89aEncoder::new(10, 10, GifOptions::default()).unwrap();
    enc.add_frame(&solid_frame(10, 10, [0, 0, 0, 255]), 10)
        .unwrap();
    let palette = enc.palette().unwrap();
    let idx = {
        let frame = solid_frame(10, 10, [0, 0, 0, 255]);
        palette.index_frame(&frame.to_rgb())
    };
    assert_eq!(idx.len(), 100);
    assert!(idx.iter().all(|&i| i == idx[0]), "uniform frame, one index");
    let bytes = enc.finish().unwrap();
    structure_check(&bytes);
}

#[test]
fn mismatched_frame_size_is_rejected() {
    let mut enc = Gif89aEncoder::new(8, 8, GifOptions::default()).unwrap();
    let err = enc.add_frame(&checker_frame(4, 4), 10).unwrap_err();
    assert!(err.to_string().contains("encode error"));
}

#[test]
fn finishing_with_no_frames_is_rejected() {
    let enc = Gif89aEncoder::new(8, 8, GifOptions::default()).unwrap();
    assert!(enc.finish().is_err());
}

#[test]
fn transparent_color_sets_gce_flag() {
    let opts = GifOptions {
        transparent: Some(Rgb::new(20, 20, 60)),
        ..GifOptions::default()
    };
    let mut enc = Gif89aEncoder::new(8, 8, opts).unwrap();
    enc.add_frame(&checker_frame(8, 8), 4).unwrap();
    let bytes = enc.finish().unwrap();
    let pos = 13 + 768 + 19;
    assert_eq!(bytes[pos + 3] & 0x01, 1, "transparency flag set");
}
