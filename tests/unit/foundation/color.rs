use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(255, 0), 0);
    assert_eq!(mul_div255(128, 255), 128);
    assert_eq!(mul_div255(128, 128), 64);
    assert_eq!(mul_div255(1, 127), 0);
    assert_eq!(mul_div255(1, 128), 1);
}

#[test]
fn mix_endpoints() {
    for v in [0u8, 1, 77, 254, 255] {
        assert_eq!(mix(v, 200, 255), v);
        assert_eq!(mix(200, v, 0), v);
    }
}

#[test]
fn mix_is_symmetric_under_swap() {
    for fg in (0..=255u8).step_by(17) {
        for bg in (0..=255u8).step_by(13) {
            for o in [0u8, 1, 127, 128, 254, 255] {
                assert_eq!(mix(fg, bg, o), mix(bg, fg, 255 - o), "fg={fg} bg={bg} o={o}");
            }
        }
    }
}

#[test]
fn argb8888_memory_order_is_bgra() {
    let c = Color::new(0x12, 0x34, 0x56);
    assert_eq!(c.to_argb8888(), [0x56, 0x34, 0x12, 0xFF]);
    assert_eq!(
        ColorFormat::Argb8888.read_pixel(&c.to_argb8888(), 0),
        0xFF12_3456
    );
}

#[test]
fn rgb565_pack_and_expand() {
    let c = Color::new(0xFF, 0x00, 0xFF);
    assert_eq!(c.to_rgb565(), 0xF81F);
    assert_eq!(unpack_rgb565(0xF81F), (31, 0, 31));
    assert_eq!(rgb565_to_rgb888(0xFFFF), (255, 255, 255));
    assert_eq!(rgb565_to_rgb888(0x0000), (0, 0, 0));
    assert_eq!(pack_rgb565(31, 63, 31), 0xFFFF);
}

#[test]
fn to_rgba8_skips_padding() {
    // Two rows of one RGB565 pixel, stride 4 bytes.
    let data = [0x1F, 0xF8, 0xAA, 0xAA, 0x00, 0x00];
    let rgba = to_rgba8(ColorFormat::Rgb565, &data, 1, 2, 4).unwrap();
    assert_eq!(rgba, vec![255, 0, 255, 255, 0, 0, 0, 255]);
}

#[test]
fn to_rgba8_rejects_short_strides_and_data() {
    let data = [0u8; 16];
    for stride in [0, 7] {
        let err = to_rgba8(ColorFormat::Argb8888, &data, 2, 2, stride).unwrap_err();
        assert!(matches!(err, HarnessError::Validation(_)), "stride {stride}: {err}");
    }
    assert!(matches!(
        to_rgba8(ColorFormat::Argb8888, &data, 2, 3, 8),
        Err(HarnessError::Validation(_))
    ));
    assert!(to_rgba8(ColorFormat::Argb8888, &data, 0, 2, 0).unwrap().is_empty());
    assert_eq!(to_rgba8(ColorFormat::Argb8888, &data, 2, 2, 8).unwrap().len(), 16);
}

#[test]
fn format_pixel_sizes() {
    assert_eq!(ColorFormat::Argb8888.pixel_size(), 4);
    assert_eq!(ColorFormat::Rgb565.pixel_size(), 2);
    assert_eq!(ColorFormat::Rgb565.to_string(), "rgb565");
}
