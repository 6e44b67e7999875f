use serde::{Deserialize, Serialize};

use crate::foundation::error::{HarnessError, HarnessResult};

/// Inclusive `min..=max` range walked in fixed steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sweep {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Sweep {
    pub const fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    pub const fn fixed(value: u32) -> Self {
        Self::new(value, value, 1)
    }

    pub fn validate(&self, name: &str) -> HarnessResult<()> {
        if self.step == 0 {
            return Err(HarnessError::validation(format!("{name}: step must be > 0")));
        }
        if self.min > self.max {
            return Err(HarnessError::validation(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn values(&self) -> impl Iterator<Item = u32> + Clone + use<> {
        (self.min..=self.max).step_by(self.step.max(1) as usize)
    }
}

/// Non-uniform opacity stepping: fine near both ends, coarse in between.
///
/// A value `o` is in the fine zone when `o <= min + 5` or `o > max - 10`. Coarse steps never
/// jump over the fine zone near `max`, and the last step always lands on `max` exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpacitySweep {
    pub min: u8,
    pub max: u8,
    pub fine_step: u8,
    pub coarse_step: u8,
}

impl OpacitySweep {
    pub const FINE_MARGIN_LOW: i32 = 5;
    pub const FINE_MARGIN_HIGH: i32 = 10;

    pub const fn new(min: u8, max: u8, fine_step: u8, coarse_step: u8) -> Self {
        Self {
            min,
            max,
            fine_step,
            coarse_step,
        }
    }

    /// `0..=255` with step 1 at the extremes and 20 in the interior.
    pub const fn full() -> Self {
        Self::new(0, 255, 1, 20)
    }

    pub const fn fixed(value: u8) -> Self {
        Self::new(value, value, 1, 1)
    }

    pub fn validate(&self, name: &str) -> HarnessResult<()> {
        if self.fine_step == 0 || self.coarse_step == 0 {
            return Err(HarnessError::validation(format!(
                "{name}: opacity steps must be > 0"
            )));
        }
        if self.min > self.max {
            return Err(HarnessError::validation(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    fn in_fine_zone(&self, o: i32) -> bool {
        o <= i32::from(self.min) + Self::FINE_MARGIN_LOW
            || o > i32::from(self.max) - Self::FINE_MARGIN_HIGH
    }

    /// The opacity that follows `o`, or `None` once `max` has been visited.
    pub fn next_after(&self, o: u8) -> Option<u8> {
        let max = i32::from(self.max);
        let o = i32::from(o);
        if o >= max {
            return None;
        }
        let next = if self.in_fine_zone(o) {
            o + i32::from(self.fine_step.max(1))
        } else {
            let entry = (max - Self::FINE_MARGIN_HIGH + 1).max(o + 1);
            (o + i32::from(self.coarse_step.max(1))).min(entry)
        };
        Some(next.min(max) as u8)
    }

    pub fn values(&self) -> OpacityValues {
        OpacityValues {
            sweep: *self,
            next: Some(self.min),
        }
    }
}

/// Iterator over the opacities of an [`OpacitySweep`].
#[derive(Clone, Debug)]
pub struct OpacityValues {
    sweep: OpacitySweep,
    next: Option<u8>,
}

impl Iterator for OpacityValues {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let current = self.next?;
        self.next = self.sweep.next_after(current);
        Some(current)
    }
}

/// How row strides (in pixels) are chosen for a given width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrideSweep {
    /// Stride equals width.
    Tight,
    /// Stride is exactly `width + extra`.
    Padded { extra: u32 },
    /// `width..=width + max_extra` in `step` increments.
    Extra { max_extra: u32, step: u32 },
    /// `width..=2 * width` in `step` increments.
    UpToDouble { step: u32 },
}

impl StrideSweep {
    pub fn validate(&self, name: &str) -> HarnessResult<()> {
        match self {
            Self::Extra { step: 0, .. } | Self::UpToDouble { step: 0 } => Err(
                HarnessError::validation(format!("{name}: stride step must be > 0")),
            ),
            _ => Ok(()),
        }
    }

    pub fn strides(&self, width: u32) -> impl Iterator<Item = u32> + Clone + use<> {
        let (upper, step) = match *self {
            Self::Tight => (width, 1),
            Self::Padded { extra } => {
                let stride = width.saturating_add(extra);
                return (stride..=stride).step_by(1);
            }
            Self::Extra { max_extra, step } => (width.saturating_add(max_extra), step),
            Self::UpToDouble { step } => (width.saturating_mul(2), step),
        };
        (width..=upper).step_by(step.max(1) as usize)
    }
}

/// Source-buffer dimensions of an image composite matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceParams {
    pub stride: StrideSweep,
    pub misalign: Sweep,
}

/// Ranges of one test matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMatrixParams {
    pub width: Sweep,
    pub height: Sweep,
    pub stride: StrideSweep,
    pub misalign: Sweep,
    pub source: Option<SourceParams>,
    pub bg_opa: OpacitySweep,
    pub fg_opa: OpacitySweep,
}

impl TestMatrixParams {
    /// A single opaque geometry without source, for quick one-off checks.
    pub const fn single(width: u32, height: u32, stride: u32, misalign: u32) -> Self {
        Self {
            width: Sweep::fixed(width),
            height: Sweep::fixed(height),
            stride: StrideSweep::Padded {
                extra: stride.saturating_sub(width),
            },
            misalign: Sweep::fixed(misalign),
            source: None,
            bg_opa: OpacitySweep::fixed(255),
            fg_opa: OpacitySweep::fixed(255),
        }
    }

    pub fn validate(&self) -> HarnessResult<()> {
        self.width.validate("width")?;
        self.height.validate("height")?;
        if self.width.min == 0 || self.height.min == 0 {
            return Err(HarnessError::validation("width and height must start at 1"));
        }
        self.stride.validate("stride")?;
        self.misalign.validate("misalign")?;
        if let Some(source) = &self.source {
            source.stride.validate("source stride")?;
            source.misalign.validate("source misalign")?;
        }
        self.bg_opa.validate("bg_opa")?;
        self.fg_opa.validate("fg_opa")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/matrix/params.rs"]
mod tests;
