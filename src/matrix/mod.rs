//! Exhaustive enumeration of geometry x alignment x opacity combinations.

pub mod params;

use serde::Serialize;

pub use params::{OpacitySweep, OpacityValues, SourceParams, StrideSweep, Sweep, TestMatrixParams};

use crate::foundation::error::HarnessResult;

/// One point of a test matrix. Strides are in pixels, misalignments in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Combination {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub misalign: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_stride: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_misalign: Option<u32>,
    pub bg_opa: u8,
    pub fg_opa: u8,
}

impl Combination {
    /// An opaque combination without source dimensions.
    pub const fn opaque(width: u32, height: u32, stride: u32, misalign: u32) -> Self {
        Self {
            width,
            height,
            stride,
            misalign,
            src_stride: None,
            src_misalign: None,
            bg_opa: 255,
            fg_opa: 255,
        }
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "width={} height={} stride={} misalign={}",
            self.width, self.height, self.stride, self.misalign
        )?;
        if let Some(s) = self.src_stride {
            write!(f, " src_stride={s}")?;
        }
        if let Some(m) = self.src_misalign {
            write!(f, " src_misalign={m}")?;
        }
        write!(f, " bg_opa={} fg_opa={}", self.bg_opa, self.fg_opa)
    }
}

/// Visit every combination of `params` and return how many were visited.
///
/// Order, outermost first: width, height, source stride, destination stride, source
/// misalignment, destination misalignment, background opacity, foreground opacity.
pub fn for_each_combination(
    params: &TestMatrixParams,
    mut visit: impl FnMut(&Combination),
) -> HarnessResult<u64> {
    params.validate()?;

    // `None` stands in for "no source" so the loop nest stays the same shape.
    let src_strides = |w: u32| -> Vec<Option<u32>> {
        match &params.source {
            Some(src) => src.stride.strides(w).map(Some).collect(),
            None => vec![None],
        }
    };
    let src_misaligns: Vec<Option<u32>> = match &params.source {
        Some(src) => src.misalign.values().map(Some).collect(),
        None => vec![None],
    };

    let mut count = 0u64;
    for width in params.width.values() {
        for height in params.height.values() {
            for src_stride in src_strides(width) {
                for stride in params.stride.strides(width) {
                    for &src_misalign in &src_misaligns {
                        for misalign in params.misalign.values() {
                            for bg_opa in params.bg_opa.values() {
                                for fg_opa in params.fg_opa.values() {
                                    visit(&Combination {
                                        width,
                                        height,
                                        stride,
                                        misalign,
                                        src_stride,
                                        src_misalign,
                                        bg_opa,
                                        fg_opa,
                                    });
                                    count += 1;
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    tracing::debug!(count, "test matrix exhausted");
    Ok(count)
}

/// Number of combinations `params` expands to.
pub fn count_combinations(params: &TestMatrixParams) -> HarnessResult<u64> {
    for_each_combination(params, |_| {})
}

#[cfg(test)]
#[path = "../../tests/unit/matrix/generator.rs"]
mod tests;
