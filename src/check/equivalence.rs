use serde::{Deserialize, Serialize};

use crate::blend::{BlendDescriptor, BlendOp, OpKind};
use crate::buffer::{GUARD_PIXELS, GuardRegion, PixelBuffer, Surface};
use crate::check::pattern::Pattern;
use crate::check::report::{FailureRecord, SuiteReport};
use crate::config::HarnessConfig;
use crate::dispatch::{Dispatcher, Implementation};
use crate::foundation::color::{Color, ColorFormat};
use crate::foundation::error::{HarnessError, HarnessResult};
use crate::matrix::{Combination, TestMatrixParams, for_each_combination};
use crate::suite::{BACKGROUND, FOREGROUND};

/// What to blit in every combination of a matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceCase {
    pub name: String,
    pub op: OpKind,
    pub dest_format: ColorFormat,
    /// Set for image composites only.
    pub src_format: Option<ColorFormat>,
    pub color: Color,
    pub background: Color,
}

impl EquivalenceCase {
    pub fn new(
        name: impl Into<String>,
        op: OpKind,
        dest_format: ColorFormat,
        src_format: Option<ColorFormat>,
    ) -> Self {
        Self {
            name: name.into(),
            op,
            dest_format,
            src_format,
            color: FOREGROUND,
            background: BACKGROUND,
        }
    }

    /// Initial destination contents for `combo`.
    pub fn dest_pattern(&self, combo: &Combination) -> Pattern {
        match self.op {
            OpKind::Fill => Pattern::IndexRamp,
            OpKind::FillWithOpacity => Pattern::Background {
                color: self.background,
                alpha: combo.bg_opa,
            },
            OpKind::ImageComposite => Pattern::EvenBytes,
        }
    }

    fn blend_op<'a>(
        &self,
        combo: &Combination,
        src: Option<Surface<'a>>,
    ) -> HarnessResult<BlendOp<'a>> {
        Ok(match self.op {
            OpKind::Fill => BlendOp::Fill { color: self.color },
            OpKind::FillWithOpacity => BlendOp::FillWithOpacity {
                color: self.color,
                opacity: combo.fg_opa,
            },
            OpKind::ImageComposite => BlendOp::ImageComposite {
                src: src.ok_or_else(|| {
                    HarnessError::validation(format!("case {} has no source format", self.name))
                })?,
                opacity: combo.fg_opa,
            },
        })
    }
}

/// Both output buffers of one combination, for image dumps.
#[derive(Clone, Debug)]
pub struct Capture {
    pub combination: Combination,
    pub format: ColorFormat,
    /// Row pitch in bytes.
    pub stride: usize,
    pub accelerated_by: Implementation,
    pub reference: Vec<u8>,
    pub accelerated: Vec<u8>,
}

struct SourceBuffer {
    buffer: PixelBuffer,
    format: ColorFormat,
    stride: usize,
}

struct Outcome {
    accelerated: PixelBuffer,
    reference: PixelBuffer,
    initial: Vec<u8>,
    accelerated_by: Implementation,
}

/// Runs the accelerated and the reference implementation side by side and compares the results.
#[derive(Clone, Debug)]
pub struct EquivalenceChecker {
    dispatcher: Dispatcher,
    guard_pixels: usize,
    reference_misalign: Option<u32>,
    max_reported_failures: usize,
}

impl EquivalenceChecker {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            guard_pixels: GUARD_PIXELS,
            reference_misalign: None,
            max_reported_failures: 16,
        }
    }

    pub fn from_config(dispatcher: Dispatcher, config: &HarnessConfig) -> Self {
        Self {
            dispatcher,
            guard_pixels: config.guard_pixels,
            reference_misalign: config.reference_misalign,
            max_reported_failures: config.max_reported_failures,
        }
    }

    pub fn with_guard_pixels(mut self, guard_pixels: usize) -> Self {
        self.guard_pixels = guard_pixels;
        self
    }

    /// Pin the reference buffer's misalignment instead of mirroring the accelerated one.
    pub fn with_reference_misalign(mut self, misalign: Option<u32>) -> Self {
        self.reference_misalign = misalign;
        self
    }

    pub fn with_max_reported_failures(mut self, max: usize) -> Self {
        self.max_reported_failures = max;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Check one combination: guards before and after, untouched row padding, identical pixels.
    #[tracing::instrument(level = "trace", skip_all, fields(case = %case.name, combo = %combo))]
    pub fn check(&self, case: &EquivalenceCase, combo: &Combination) -> HarnessResult<()> {
        let outcome = self.execute(case, combo)?;
        let format = case.dest_format;
        let stride = combo.stride as usize * format.pixel_size();
        let row_bytes = combo.width as usize * format.pixel_size();

        check_guards(&outcome.accelerated, outcome.accelerated_by, combo)?;
        check_guards(&outcome.reference, Implementation::Reference, combo)?;
        for (buffer, implementation) in [
            (&outcome.accelerated, outcome.accelerated_by),
            (&outcome.reference, Implementation::Reference),
        ] {
            check_padding(
                buffer.active(),
                &outcome.initial,
                stride,
                row_bytes,
                implementation,
                combo,
            )?;
        }

        let (acc, reference) = (outcome.accelerated.active(), outcome.reference.active());
        for y in 0..combo.height {
            for x in 0..combo.width {
                let at = y as usize * stride + x as usize * format.pixel_size();
                let (r, a) = (format.read_pixel(reference, at), format.read_pixel(acc, at));
                if r != a {
                    return Err(HarnessError::PixelMismatch {
                        x,
                        y,
                        reference: r,
                        accelerated: a,
                        params: *combo,
                    });
                }
            }
        }

        outcome.accelerated.release();
        outcome.reference.release();
        Ok(())
    }

    /// Check every combination of `params`. Individual failures are collected, not fatal.
    pub fn run(
        &self,
        case: &EquivalenceCase,
        params: &TestMatrixParams,
    ) -> HarnessResult<SuiteReport> {
        let accelerated = self
            .dispatcher
            .has_accelerated(case.op, case.dest_format, case.src_format);
        tracing::info!(case = %case.name, accelerated, "equivalence run started");

        let mut failures = Vec::new();
        let mut failure_count = 0u64;
        let combinations = for_each_combination(params, |combo| {
            if let Err(err) = self.check(case, combo) {
                if failures.len() < self.max_reported_failures {
                    tracing::warn!(case = %case.name, %err, "combination failed");
                    failures.push(FailureRecord::from(&err));
                }
                failure_count += 1;
            }
        })?;

        tracing::info!(
            case = %case.name,
            combinations,
            failure_count,
            "equivalence run finished"
        );
        Ok(SuiteReport {
            case: case.name.clone(),
            combinations,
            failure_count,
            accelerated,
            failures,
        })
    }

    /// Re-run one combination and hand back both outputs without judging them.
    pub fn capture(&self, case: &EquivalenceCase, combo: &Combination) -> HarnessResult<Capture> {
        let outcome = self.execute(case, combo)?;
        Ok(Capture {
            combination: *combo,
            format: case.dest_format,
            stride: combo.stride as usize * case.dest_format.pixel_size(),
            accelerated_by: outcome.accelerated_by,
            reference: outcome.reference.active().to_vec(),
            accelerated: outcome.accelerated.active().to_vec(),
        })
    }

    fn execute(&self, case: &EquivalenceCase, combo: &Combination) -> HarnessResult<Outcome> {
        let format = case.dest_format;
        let reference_misalign = self.reference_misalign.unwrap_or(combo.misalign);
        let mut accelerated = PixelBuffer::for_rows(
            combo.height,
            combo.stride,
            format,
            combo.misalign as usize,
            self.guard_pixels,
        )?;
        let mut reference = PixelBuffer::for_rows(
            combo.height,
            combo.stride,
            format,
            reference_misalign as usize,
            self.guard_pixels,
        )?;

        let pattern = case.dest_pattern(combo);
        pattern.paint(format, accelerated.active_mut());
        pattern.paint(format, reference.active_mut());
        let initial = reference.active().to_vec();

        check_guards(&accelerated, Implementation::Accelerated, combo)?;
        check_guards(&reference, Implementation::Reference, combo)?;

        let source = self.source_buffer(case, combo)?;
        let accelerated_by = self.apply(case, combo, &mut accelerated, source.as_ref(), false)?;
        self.apply(case, combo, &mut reference, source.as_ref(), true)?;
        if let Some(source) = source {
            source.buffer.release();
        }

        Ok(Outcome {
            accelerated,
            reference,
            initial,
            accelerated_by,
        })
    }

    fn source_buffer(
        &self,
        case: &EquivalenceCase,
        combo: &Combination,
    ) -> HarnessResult<Option<SourceBuffer>> {
        let Some(format) = case.src_format else {
            return Ok(None);
        };
        let stride_px = combo.src_stride.unwrap_or(combo.width);
        let mut buffer = PixelBuffer::for_rows(
            combo.height,
            stride_px,
            format,
            combo.src_misalign.unwrap_or(0) as usize,
            self.guard_pixels,
        )?;
        Pattern::OddBytes.paint(format, buffer.active_mut());
        Ok(Some(SourceBuffer {
            buffer,
            format,
            stride: stride_px as usize * format.pixel_size(),
        }))
    }

    fn apply(
        &self,
        case: &EquivalenceCase,
        combo: &Combination,
        dest: &mut PixelBuffer,
        source: Option<&SourceBuffer>,
        force_reference: bool,
    ) -> HarnessResult<Implementation> {
        let format = case.dest_format;
        let surface = dest.surface_mut(
            combo.width,
            combo.height,
            combo.stride as usize * format.pixel_size(),
            format,
        )?;
        let src = source
            .map(|s| {
                s.buffer
                    .surface(combo.width, combo.height, s.stride, s.format)
            })
            .transpose()?;
        let op = case.blend_op(combo, src)?;
        let mut desc = BlendDescriptor::new(surface, op).force_reference(force_reference);
        self.dispatcher.apply(&mut desc)
    }
}

fn check_guards(
    buffer: &PixelBuffer,
    implementation: Implementation,
    combo: &Combination,
) -> HarnessResult<()> {
    match buffer.first_guard_violation() {
        None => Ok(()),
        Some((region, offset)) => Err(HarnessError::GuardViolation {
            implementation,
            region,
            offset,
            params: *combo,
        }),
    }
}

/// Bytes between the declared row width and the stride must still hold their initial values.
fn check_padding(
    active: &[u8],
    initial: &[u8],
    stride: usize,
    row_bytes: usize,
    implementation: Implementation,
    combo: &Combination,
) -> HarnessResult<()> {
    if stride == row_bytes {
        return Ok(());
    }
    for row in 0..combo.height {
        let start = row as usize * stride + row_bytes;
        let end = start + stride - row_bytes;
        if let Some(offset) = active[start..end]
            .iter()
            .zip(&initial[start..end])
            .position(|(a, b)| a != b)
        {
            return Err(HarnessError::GuardViolation {
                implementation,
                region: GuardRegion::RowPadding { row },
                offset,
                params: *combo,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/check/equivalence.rs"]
mod tests;
