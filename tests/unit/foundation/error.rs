use super::*;
use crate::blend::OpKind;
use crate::dispatch::Platform;
use crate::foundation::color::ColorFormat;

fn combo() -> Combination {
    Combination::opaque(16, 16, 16, 3)
}

#[test]
fn display_prefixes_are_stable() {
    assert!(
        HarnessError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        HarnessError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        HarnessError::AllocationFailure { bytes: 64 }
            .to_string()
            .starts_with("allocation failure:")
    );
}

#[test]
fn mismatch_message_carries_the_full_parameter_tuple() {
    let err = HarnessError::PixelMismatch {
        x: 3,
        y: 1,
        reference: 0xFF12_3456,
        accelerated: 0xFF12_3457,
        params: combo(),
    };
    let msg = err.to_string();
    assert!(msg.starts_with("pixel mismatch:"));
    assert!(msg.contains("reference=0xff123456"));
    assert!(msg.contains("accelerated=0xff123457"));
    assert!(msg.contains("width=16 height=16 stride=16 misalign=3"));
    assert!(msg.contains("bg_opa=255 fg_opa=255"));
}

#[test]
fn guard_violation_names_region_and_implementation() {
    let err = HarnessError::GuardViolation {
        implementation: Implementation::Accelerated,
        region: GuardRegion::Trailing,
        offset: 2,
        params: combo(),
    };
    let msg = err.to_string();
    assert!(msg.starts_with("guard violation:"));
    assert!(msg.contains("accelerated implementation wrote trailing guard at byte 2"));
}

#[test]
fn params_only_on_correctness_failures() {
    let mismatch = HarnessError::PixelMismatch {
        x: 0,
        y: 0,
        reference: 0,
        accelerated: 1,
        params: combo(),
    };
    assert_eq!(mismatch.params(), Some(&combo()));
    assert!(HarnessError::validation("x").params().is_none());
}

#[test]
fn threshold_errors_name_the_key() {
    let key = ThresholdKey {
        op: OpKind::Fill,
        format: ColorFormat::Argb8888,
        platform: Platform::X86_64,
    };
    let missing = HarnessError::MissingThresholdEntry { key };
    assert_eq!(
        missing.to_string(),
        "missing threshold entry: no regression threshold for fill/argb8888/x86_64"
    );

    let regression = HarnessError::RegressionBelowThreshold {
        key,
        scenario: BenchScenario::Corner,
        measured: 1.1,
        required: 1.2,
    };
    assert_eq!(
        regression.to_string(),
        "regression below threshold: fill/argb8888/x86_64 corner speedup 1.100 < required 1.200"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = HarnessError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
