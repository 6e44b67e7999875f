use serde::Serialize;

use crate::foundation::error::HarnessError;
use crate::matrix::Combination;

/// One failing combination, kept in a serializable form.
#[derive(Clone, Debug, Serialize)]
pub struct FailureRecord {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Combination>,
}

impl From<&HarnessError> for FailureRecord {
    fn from(err: &HarnessError) -> Self {
        let kind = match err {
            HarnessError::AllocationFailure { .. } => "allocation_failure",
            HarnessError::GuardViolation { .. } => "guard_violation",
            HarnessError::PixelMismatch { .. } => "pixel_mismatch",
            HarnessError::MissingThresholdEntry { .. } => "missing_threshold_entry",
            HarnessError::RegressionBelowThreshold { .. } => "regression_below_threshold",
            HarnessError::Validation(_) => "validation",
            HarnessError::Serde(_) => "serde",
            HarnessError::Other(_) => "other",
        };
        Self {
            kind,
            message: err.to_string(),
            params: err.params().copied(),
        }
    }
}

/// Outcome of one equivalence case over its whole matrix.
#[derive(Clone, Debug, Serialize)]
pub struct SuiteReport {
    pub case: String,
    pub combinations: u64,
    pub failure_count: u64,
    /// Whether an accelerated routine was selected for this case at all.
    pub accelerated: bool,
    /// The first failures, capped by the configured limit.
    pub failures: Vec<FailureRecord>,
}

impl SuiteReport {
    pub fn is_clean(&self) -> bool {
        self.failure_count == 0
    }
}

impl std::fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.accelerated {
            "accelerated"
        } else {
            "reference only"
        };
        write!(
            f,
            "{}: {} combinations, {} failures ({path})",
            self.case, self.combinations, self.failure_count
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}", failure.message)?;
        }
        if self.failure_count > self.failures.len() as u64 {
            write!(
                f,
                "\n  ... {} more",
                self.failure_count - self.failures.len() as u64
            )?;
        }
        Ok(())
    }
}
