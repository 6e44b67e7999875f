use super::*;
use crate::accel::AccelRoutine;
use crate::blend::{BlitJob, reference};
use crate::dispatch::{Platform, Registry, RoutineKey};
use crate::matrix::{OpacitySweep, StrideSweep, Sweep};

fn fill_case() -> EquivalenceCase {
    EquivalenceCase::new("fill", OpKind::Fill, ColorFormat::Argb8888, None)
}

fn with_fill_routine(run: fn(&mut BlitJob<'_>) -> HarnessResult<()>) -> Dispatcher {
    let platform = Platform::Portable;
    let mut registry = Registry::empty();
    registry
        .register(
            RoutineKey {
                op: OpKind::Fill,
                dest_format: ColorFormat::Argb8888,
                src_format: None,
                platform,
            },
            AccelRoutine { name: "test", run },
        )
        .unwrap();
    Dispatcher::new(registry, platform)
}

fn faithful(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    reference::blit(job);
    Ok(())
}

/// Correct except for the green channel of the last pixel.
fn off_by_one(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    reference::blit(job);
    let (w, h) = (job.width, job.height);
    let row = job.row(h - 1);
    row.dest[(w - 1) * 4 + 1] ^= 1;
    Ok(())
}

/// Correct, then scribbles on the first padding byte after row 0.
fn pads_over(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    reference::blit(job);
    let at = job.row_bytes();
    job.dest[at] = 0xAA;
    Ok(())
}

#[test]
fn faithful_routine_passes() {
    let checker = EquivalenceChecker::new(with_fill_routine(faithful));
    checker
        .check(&fill_case(), &Combination::opaque(16, 16, 16, 3))
        .unwrap();
}

#[test]
fn mismatch_names_the_pixel() {
    let checker = EquivalenceChecker::new(with_fill_routine(off_by_one));
    let combo = Combination::opaque(5, 3, 7, 1);
    match checker.check(&fill_case(), &combo) {
        Err(HarnessError::PixelMismatch {
            x,
            y,
            reference,
            accelerated,
            params,
        }) => {
            assert_eq!((x, y), (4, 2));
            assert_eq!(reference ^ accelerated, 0x100);
            assert_eq!(params, combo);
        }
        other => panic!("expected a pixel mismatch, got {other:?}"),
    }
}

#[test]
fn padding_write_is_a_guard_violation() {
    let checker = EquivalenceChecker::new(with_fill_routine(pads_over));
    let combo = Combination::opaque(4, 2, 6, 0);
    match checker.check(&fill_case(), &combo) {
        Err(HarnessError::GuardViolation {
            implementation,
            region,
            offset,
            ..
        }) => {
            assert_eq!(implementation, Implementation::Accelerated);
            assert_eq!(region, GuardRegion::RowPadding { row: 0 });
            assert_eq!(offset, 0);
        }
        other => panic!("expected a guard violation, got {other:?}"),
    }
}

#[test]
fn tight_stride_has_no_padding_to_violate() {
    let checker = EquivalenceChecker::new(with_fill_routine(faithful));
    checker
        .check(&fill_case(), &Combination::opaque(4, 2, 4, 0))
        .unwrap();
}

#[test]
fn run_caps_reported_failures() {
    let checker =
        EquivalenceChecker::new(with_fill_routine(off_by_one)).with_max_reported_failures(2);
    let mut params = TestMatrixParams::single(1, 1, 1, 0);
    params.width = Sweep::new(1, 5, 1);
    let report = checker.run(&fill_case(), &params).unwrap();
    assert_eq!(report.combinations, 5);
    assert_eq!(report.failure_count, 5);
    assert_eq!(report.failures.len(), 2);
    assert!(report.accelerated);
    assert!(!report.is_clean());
    assert!(report.failures.iter().all(|f| f.kind == "pixel_mismatch"));
    assert!(report.to_string().contains("... 3 more"));
}

#[test]
fn reference_only_run_is_clean() {
    let checker = EquivalenceChecker::new(Dispatcher::reference_only());
    let params = TestMatrixParams {
        width: Sweep::new(1, 6, 1),
        height: Sweep::new(1, 2, 1),
        stride: StrideSweep::Extra {
            max_extra: 1,
            step: 1,
        },
        misalign: Sweep::new(0, 3, 1),
        source: None,
        bg_opa: OpacitySweep::fixed(255),
        fg_opa: OpacitySweep::full(),
    };
    let case = EquivalenceCase::new(
        "fill_opa",
        OpKind::FillWithOpacity,
        ColorFormat::Rgb565,
        None,
    );
    let report = checker.run(&case, &params).unwrap();
    assert!(report.is_clean());
    assert!(!report.accelerated);
    assert_eq!(report.combinations, 6 * 2 * 2 * 4 * 28);
}

#[test]
fn composite_case_without_source_is_a_setup_error() {
    let checker = EquivalenceChecker::new(Dispatcher::reference_only());
    let case = EquivalenceCase::new(
        "broken",
        OpKind::ImageComposite,
        ColorFormat::Argb8888,
        None,
    );
    let err = checker
        .check(&case, &Combination::opaque(2, 2, 2, 0))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Validation(_)));
}

#[test]
fn capture_returns_both_outputs() {
    let checker = EquivalenceChecker::new(with_fill_routine(off_by_one));
    let combo = Combination::opaque(3, 2, 4, 2);
    let capture = checker.capture(&fill_case(), &combo).unwrap();
    assert_eq!(capture.accelerated_by, Implementation::Accelerated);
    assert_eq!(capture.stride, 16);
    assert_eq!(capture.reference.len(), 2 * 16);
    assert_ne!(capture.reference, capture.accelerated);
}

#[test]
fn pinned_reference_misalignment_still_matches() {
    let checker = EquivalenceChecker::new(Dispatcher::native()).with_reference_misalign(Some(0));
    let case = EquivalenceCase::new(
        "image",
        OpKind::ImageComposite,
        ColorFormat::Argb8888,
        Some(ColorFormat::Argb8888),
    );
    let mut combo = Combination::opaque(9, 2, 11, 7);
    combo.src_stride = Some(10);
    combo.src_misalign = Some(1);
    combo.fg_opa = 128;
    checker.check(&case, &combo).unwrap();
}

#[test]
fn dest_patterns_follow_the_operation() {
    let combo = Combination {
        bg_opa: 26,
        ..Combination::opaque(1, 1, 1, 0)
    };
    assert_eq!(fill_case().dest_pattern(&combo), Pattern::IndexRamp);
    let opa = EquivalenceCase::new("o", OpKind::FillWithOpacity, ColorFormat::Argb8888, None);
    assert_eq!(
        opa.dest_pattern(&combo),
        Pattern::Background {
            color: BACKGROUND,
            alpha: 26
        }
    );
}
