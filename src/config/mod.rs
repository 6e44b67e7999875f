//! Harness tunables, loadable from JSON.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::buffer::GUARD_PIXELS;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Knobs shared by the equivalence checker and the benchmark runner.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Zeroed sentinel pixels on each side of every test buffer.
    pub guard_pixels: usize,
    /// Fixed misalignment for the reference buffer; `None` mirrors the accelerated buffer.
    pub reference_misalign: Option<u32>,
    /// Failures kept verbatim per equivalence case.
    pub max_reported_failures: usize,
    /// Timed invocations per benchmark measurement.
    pub bench_iterations: u32,
    /// Measurements per benchmark; the median is reported.
    pub bench_repeats: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            guard_pixels: GUARD_PIXELS,
            reference_misalign: None,
            max_reported_failures: 16,
            bench_iterations: 750,
            bench_repeats: 1,
        }
    }
}

impl HarnessConfig {
    pub fn from_json_str(s: &str) -> HarnessResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| HarnessError::serde(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.guard_pixels == 0 {
            return Err(HarnessError::validation("guard_pixels must be > 0"));
        }
        if self.bench_iterations == 0 {
            return Err(HarnessError::validation("bench_iterations must be > 0"));
        }
        if self.bench_repeats == 0 {
            return Err(HarnessError::validation("bench_repeats must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/config.rs"]
mod tests;
