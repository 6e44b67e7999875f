use crate::buffer::GuardRegion;
use crate::dispatch::Implementation;
use crate::matrix::Combination;
use crate::perf::{BenchScenario, ThresholdKey};

/// Convenience result type used across the harness.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Every condition the harness can detect.
///
/// Nothing here is retried. Each variant points at either a correctness bug in an accelerated
/// routine, a stale threshold table, or a malformed test setup.
#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    /// The backing storage for a test buffer could not be reserved.
    #[error("allocation failure: could not reserve {bytes} bytes")]
    AllocationFailure {
        /// Requested size including guards, misalignment and alignment slack.
        bytes: usize,
    },

    /// A blit wrote outside of its declared destination rows.
    #[error(
        "guard violation: {implementation} implementation wrote {region} at byte {offset} ({params})"
    )]
    GuardViolation {
        /// Which implementation's buffer was corrupted.
        implementation: Implementation,
        /// Which sentinel region was touched.
        region: GuardRegion,
        /// Byte offset of the first non-matching byte within that region.
        offset: usize,
        /// The matrix combination that produced the overrun.
        params: Combination,
    },

    /// The accelerated output differs from the reference output.
    #[error(
        "pixel mismatch: at x={x} y={y} reference=0x{reference:08x} accelerated=0x{accelerated:08x} ({params})"
    )]
    PixelMismatch {
        /// Column of the first differing pixel.
        x: u32,
        /// Row of the first differing pixel.
        y: u32,
        /// Pixel value written by the reference implementation.
        reference: u32,
        /// Pixel value written by the accelerated implementation.
        accelerated: u32,
        /// The matrix combination that produced the mismatch.
        params: Combination,
    },

    /// A benchmark was evaluated against a key the threshold table does not know.
    #[error("missing threshold entry: no regression threshold for {key}")]
    MissingThresholdEntry {
        /// The key that was looked up.
        key: ThresholdKey,
    },

    /// The accelerated implementation is not fast enough anymore.
    #[error(
        "regression below threshold: {key} {scenario} speedup {measured:.3} < required {required:.3}"
    )]
    RegressionBelowThreshold {
        /// The threshold key that was evaluated.
        key: ThresholdKey,
        /// Common or corner geometry.
        scenario: BenchScenario,
        /// Measured `reference / accelerated` cycle ratio.
        measured: f64,
        /// Minimum ratio from the threshold table.
        required: f64,
    },

    /// Invalid descriptor, matrix parameters or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing thresholds, configs or reports.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    /// Build a [`HarnessError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`HarnessError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The matrix combination attached to a correctness failure, if any.
    pub fn params(&self) -> Option<&Combination> {
        match self {
            Self::GuardViolation { params, .. } | Self::PixelMismatch { params, .. } => {
                Some(params)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
