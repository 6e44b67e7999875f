use super::*;

#[test]
fn active_region_honors_misalignment() {
    for misalign in 0..=16 {
        let buf = PixelBuffer::allocate(10, 4, misalign, GUARD_PIXELS).unwrap();
        let leading = buf.guard_before().as_ptr() as usize;
        assert_eq!(leading % ALLOC_ALIGN, misalign % ALLOC_ALIGN, "misalign={misalign}");
        assert_eq!(buf.active_addr(), leading + GUARD_PIXELS * 4);
        assert_eq!(buf.active().len(), 40);
    }
}

#[test]
fn fresh_buffer_is_zero_with_intact_guards() {
    let buf = PixelBuffer::allocate(16, 2, 3, 4).unwrap();
    assert!(buf.verify_guards());
    assert!(buf.active().iter().all(|&b| b == 0));
    assert_eq!(buf.guard_before().len(), 8);
    assert_eq!(buf.guard_after().len(), 8);
}

#[test]
fn writes_inside_active_region_keep_guards() {
    let mut buf = PixelBuffer::allocate(8, 4, 1, 4).unwrap();
    buf.active_mut().fill(0xFF);
    assert!(buf.verify_guards());
}

#[test]
fn overrun_is_reported_with_offset() {
    let mut buf = PixelBuffer::allocate(8, 4, 0, 4).unwrap();
    let end = buf.region_start + 4 * 4 + 8 * 4;
    buf.storage[end + 5] = 1;
    assert_eq!(
        buf.first_guard_violation(),
        Some((GuardRegion::Trailing, 5))
    );

    let mut buf = PixelBuffer::allocate(8, 4, 0, 4).unwrap();
    let start = buf.region_start;
    buf.storage[start + 15] = 9;
    assert_eq!(buf.first_guard_violation(), Some((GuardRegion::Leading, 15)));
}

#[test]
fn for_rows_sizes_by_stride() {
    let buf = PixelBuffer::for_rows(3, 10, ColorFormat::Rgb565, 0, 4).unwrap();
    assert_eq!(buf.active_len(), 30);
    assert_eq!(buf.active().len(), 60);
    assert_eq!(buf.pixel_size(), 2);
}

#[test]
fn surface_rejects_wrong_pixel_size() {
    let mut buf = PixelBuffer::for_rows(2, 4, ColorFormat::Rgb565, 0, 4).unwrap();
    assert!(matches!(
        buf.surface_mut(4, 2, 16, ColorFormat::Argb8888),
        Err(HarnessError::Validation(_))
    ));
    assert!(buf.surface_mut(4, 2, 8, ColorFormat::Rgb565).is_ok());
}

#[test]
fn absurd_sizes_fail_as_allocation_failure() {
    let err = PixelBuffer::allocate(usize::MAX / 2, 4, 0, 4).unwrap_err();
    assert!(matches!(err, HarnessError::AllocationFailure { .. }));
}

#[test]
fn zero_pixel_size_is_rejected() {
    assert!(matches!(
        PixelBuffer::allocate(4, 0, 0, 4),
        Err(HarnessError::Validation(_))
    ));
}

#[test]
fn region_display() {
    assert_eq!(GuardRegion::Leading.to_string(), "leading guard");
    assert_eq!(
        GuardRegion::RowPadding { row: 3 }.to_string(),
        "padding of row 3"
    );
}
