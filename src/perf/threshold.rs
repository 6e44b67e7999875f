use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::blend::OpKind;
use crate::dispatch::Platform;
use crate::foundation::color::ColorFormat;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Which benchmark geometry a measurement belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchScenario {
    /// Aligned, full-size buffer.
    Common,
    /// Misaligned, odd-sized buffer.
    Corner,
}

impl std::fmt::Display for BenchScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Common => "common",
            Self::Corner => "corner",
        })
    }
}

/// Exact-match lookup key of the threshold table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThresholdKey {
    pub op: OpKind,
    pub format: ColorFormat,
    pub platform: Platform,
}

impl std::fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.op, self.format, self.platform)
    }
}

/// Minimum `reference / accelerated` ratios for one key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkThreshold {
    pub op: OpKind,
    pub format: ColorFormat,
    pub platform: Platform,
    pub common: f64,
    pub corner: f64,
}

impl BenchmarkThreshold {
    pub fn key(&self) -> ThresholdKey {
        ThresholdKey {
            op: self.op,
            format: self.format,
            platform: self.platform,
        }
    }

    pub fn required(&self, scenario: BenchScenario) -> f64 {
        match scenario {
            BenchScenario::Common => self.common,
            BenchScenario::Corner => self.corner,
        }
    }
}

const fn entry(
    op: OpKind,
    format: ColorFormat,
    platform: Platform,
    common: f64,
    corner: f64,
) -> BenchmarkThreshold {
    BenchmarkThreshold {
        op,
        format,
        platform,
        common,
        corner,
    }
}

// Composites on 565 sources are keyed by the destination format; the source matches it.
const BUILTIN: &[BenchmarkThreshold] = &[
    entry(OpKind::Fill, ColorFormat::Argb8888, Platform::X86_64, 1.5, 1.2),
    entry(OpKind::Fill, ColorFormat::Rgb565, Platform::X86_64, 1.5, 1.2),
    entry(OpKind::FillWithOpacity, ColorFormat::Argb8888, Platform::X86_64, 2.0, 1.5),
    entry(OpKind::ImageComposite, ColorFormat::Rgb565, Platform::X86_64, 1.5, 1.2),
    entry(OpKind::ImageComposite, ColorFormat::Argb8888, Platform::X86_64, 2.0, 1.5),
    entry(OpKind::Fill, ColorFormat::Argb8888, Platform::Aarch64, 1.3, 1.1),
    entry(OpKind::Fill, ColorFormat::Rgb565, Platform::Aarch64, 1.3, 1.1),
];

/// Read-only regression thresholds, looked up by exact key.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    entries: Vec<BenchmarkThreshold>,
}

impl ThresholdTable {
    /// The table shipped with the harness.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN.to_vec(),
        }
    }

    /// Build a table, rejecting duplicate keys and non-positive ratios.
    pub fn from_entries(entries: Vec<BenchmarkThreshold>) -> HarnessResult<Self> {
        for (i, e) in entries.iter().enumerate() {
            if !(e.common.is_finite() && e.common > 0.0 && e.corner.is_finite() && e.corner > 0.0)
            {
                return Err(HarnessError::validation(format!(
                    "threshold {} must be positive and finite",
                    e.key()
                )));
            }
            if entries[..i].iter().any(|prev| prev.key() == e.key()) {
                return Err(HarnessError::validation(format!(
                    "duplicate threshold entry {}",
                    e.key()
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json_str(s: &str) -> HarnessResult<Self> {
        let entries: Vec<BenchmarkThreshold> =
            serde_json::from_str(s).map_err(|e| HarnessError::serde(e.to_string()))?;
        Self::from_entries(entries)
    }

    pub fn from_path(path: &Path) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read thresholds {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> HarnessResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::serde(e.to_string()))
    }

    pub fn entries(&self) -> &[BenchmarkThreshold] {
        &self.entries
    }

    /// A missing entry is a configuration error, never a silent pass.
    pub fn lookup(&self, key: &ThresholdKey) -> HarnessResult<&BenchmarkThreshold> {
        self.entries
            .iter()
            .find(|e| e.key() == *key)
            .ok_or(HarnessError::MissingThresholdEntry { key: *key })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/perf/threshold.rs"]
mod tests;
