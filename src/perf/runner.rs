use serde::{Deserialize, Serialize};

use crate::blend::{BlendDescriptor, BlendOp, OpKind};
use crate::buffer::{GUARD_PIXELS, PixelBuffer, Surface};
use crate::check::Pattern;
use crate::dispatch::{Dispatcher, Implementation};
use crate::foundation::color::{Color, ColorFormat};
use crate::foundation::error::{HarnessError, HarnessResult};
use crate::matrix::Combination;
use crate::perf::counter::{CycleCounter, elapsed};
use crate::perf::threshold::{BenchScenario, ThresholdKey, ThresholdTable};

/// Default timed invocations per measurement.
pub const DEFAULT_ITERATIONS: u32 = 750;

/// Buffer shape of one benchmark scenario. Stride in pixels, misalignment in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchGeometry {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub misalign: u32,
}

impl BenchGeometry {
    /// 16-byte aligned, 128x128.
    pub const COMMON: Self = Self {
        width: 128,
        height: 128,
        stride: 128,
        misalign: 0,
    };

    /// 1-byte misaligned, 127x127 in rows of 128.
    pub const CORNER: Self = Self {
        width: 127,
        height: 127,
        stride: 128,
        misalign: 1,
    };

    pub fn for_scenario(scenario: BenchScenario) -> Self {
        match scenario {
            BenchScenario::Common => Self::COMMON,
            BenchScenario::Corner => Self::CORNER,
        }
    }

    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    fn combination(&self, opacity: u8) -> Combination {
        Combination {
            fg_opa: opacity,
            ..Combination::opaque(self.width, self.height, self.stride, self.misalign)
        }
    }
}

/// How the destination is restored between timed iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReinitPolicy {
    /// The operation is idempotent; the destination starts zeroed and is never refilled.
    Static,
    /// Repaint the whole active region before every iteration.
    Refill { pattern: Pattern },
}

impl ReinitPolicy {
    fn initial(&self) -> Pattern {
        match self {
            Self::Static => Pattern::Zero,
            Self::Refill { pattern } => *pattern,
        }
    }
}

/// One benchmarked operation with its per-scenario reinitialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchCase {
    pub name: String,
    pub op: OpKind,
    pub dest_format: ColorFormat,
    pub src_format: Option<ColorFormat>,
    pub color: Color,
    pub opacity: u8,
    pub common_reinit: ReinitPolicy,
    pub corner_reinit: ReinitPolicy,
    pub iterations: u32,
}

impl BenchCase {
    pub fn reinit(&self, scenario: BenchScenario) -> ReinitPolicy {
        match scenario {
            BenchScenario::Common => self.common_reinit,
            BenchScenario::Corner => self.corner_reinit,
        }
    }

    fn blend_op<'a>(&self, src: Option<Surface<'a>>) -> HarnessResult<BlendOp<'a>> {
        Ok(match self.op {
            OpKind::Fill => BlendOp::Fill { color: self.color },
            OpKind::FillWithOpacity => BlendOp::FillWithOpacity {
                color: self.color,
                opacity: self.opacity,
            },
            OpKind::ImageComposite => BlendOp::ImageComposite {
                src: src.ok_or_else(|| {
                    HarnessError::validation(format!("bench {} has no source format", self.name))
                })?,
                opacity: self.opacity,
            },
        })
    }
}

/// Timing of one implementation on one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct Measurement {
    /// The implementation that actually ran (an accelerated request may fail closed).
    pub implementation: Implementation,
    pub iterations: u32,
    pub repeats: u32,
    /// Sum over every timed invocation of every repeat.
    pub total_cycles: u64,
    /// Median over repeats.
    pub cycles_per_iteration: f64,
    pub cycles_per_pixel: f64,
    /// Active region after the last iteration.
    #[serde(skip)]
    pub output: Vec<u8>,
}

/// Reference and accelerated timings of one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct Comparison {
    pub scenario: BenchScenario,
    pub geometry: BenchGeometry,
    pub reference: Measurement,
    pub accelerated: Measurement,
}

impl Comparison {
    /// `reference / accelerated` cycles per iteration.
    pub fn speedup(&self) -> f64 {
        speedup(
            self.reference.cycles_per_iteration,
            self.accelerated.cycles_per_iteration,
        )
    }
}

pub fn speedup(reference: f64, accelerated: f64) -> f64 {
    if accelerated <= 0.0 {
        return f64::INFINITY;
    }
    reference / accelerated
}

/// Both scenarios of one benchmark case.
#[derive(Clone, Debug, Serialize)]
pub struct BenchResult {
    pub case: String,
    pub key: ThresholdKey,
    pub unit: &'static str,
    pub common: Comparison,
    pub corner: Comparison,
}

impl BenchResult {
    pub fn evaluate(&self, table: &ThresholdTable) -> HarnessResult<Verdict> {
        evaluate(&self.common, &self.corner, table, &self.key)
    }
}

/// Passing speedups and the thresholds they were held against.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Verdict {
    pub key: ThresholdKey,
    pub common_speedup: f64,
    pub common_required: f64,
    pub corner_speedup: f64,
    pub corner_required: f64,
}

/// Hold both scenarios against the table entry for `key`.
///
/// Each scenario is judged on its own; the first one below its threshold is returned as the
/// error, and both are logged.
pub fn evaluate(
    common: &Comparison,
    corner: &Comparison,
    table: &ThresholdTable,
    key: &ThresholdKey,
) -> HarnessResult<Verdict> {
    let entry = table.lookup(key)?;
    let mut first_failure = None;
    for cmp in [common, corner] {
        let measured = cmp.speedup();
        let required = entry.required(cmp.scenario);
        if measured < required {
            tracing::warn!(%key, scenario = %cmp.scenario, measured, required, "speedup below threshold");
            first_failure.get_or_insert(HarnessError::RegressionBelowThreshold {
                key: *key,
                scenario: cmp.scenario,
                measured,
                required,
            });
        } else {
            tracing::debug!(%key, scenario = %cmp.scenario, measured, required, "speedup ok");
        }
    }
    if let Some(err) = first_failure {
        return Err(err);
    }
    Ok(Verdict {
        key: *key,
        common_speedup: common.speedup(),
        common_required: entry.common,
        corner_speedup: corner.speedup(),
        corner_required: entry.corner,
    })
}

/// Times implementations with an injected counter.
pub struct BenchRunner<'a> {
    dispatcher: &'a Dispatcher,
    counter: &'a dyn CycleCounter,
    repeats: u32,
    guard_pixels: usize,
}

impl<'a> BenchRunner<'a> {
    pub fn new(dispatcher: &'a Dispatcher, counter: &'a dyn CycleCounter) -> Self {
        Self {
            dispatcher,
            counter,
            repeats: 1,
            guard_pixels: GUARD_PIXELS,
        }
    }

    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats.max(1);
        self
    }

    pub fn with_guard_pixels(mut self, guard_pixels: usize) -> Self {
        self.guard_pixels = guard_pixels;
        self
    }

    /// One untimed warm-up, then `iterations` timed invocations per repeat.
    ///
    /// Allocation, initialization and reinitialization stay outside the timed bracket.
    #[tracing::instrument(level = "debug", skip_all, fields(case = %case.name, scenario = %scenario, implementation = %implementation))]
    pub fn measure(
        &self,
        case: &BenchCase,
        scenario: BenchScenario,
        implementation: Implementation,
        iterations: u32,
    ) -> HarnessResult<Measurement> {
        if iterations == 0 {
            return Err(HarnessError::validation("iterations must be > 0"));
        }
        let geometry = BenchGeometry::for_scenario(scenario);
        let reinit = case.reinit(scenario);
        let format = case.dest_format;

        let mut dest = PixelBuffer::for_rows(
            geometry.height,
            geometry.stride,
            format,
            geometry.misalign as usize,
            self.guard_pixels,
        )?;
        reinit.initial().paint(format, dest.active_mut());

        let source = match case.src_format {
            Some(src_format) => {
                let mut buffer = PixelBuffer::for_rows(
                    geometry.height,
                    geometry.stride,
                    src_format,
                    geometry.misalign as usize,
                    self.guard_pixels,
                )?;
                Pattern::OddBytes.paint(src_format, buffer.active_mut());
                Some((buffer, src_format))
            }
            None => None,
        };
        let src = source
            .as_ref()
            .map(|(buffer, f)| {
                buffer.surface(
                    geometry.width,
                    geometry.height,
                    geometry.stride as usize * f.pixel_size(),
                    *f,
                )
            })
            .transpose()?;

        let surface = dest.surface_mut(
            geometry.width,
            geometry.height,
            geometry.stride as usize * format.pixel_size(),
            format,
        )?;
        let mut desc = BlendDescriptor::new(surface, case.blend_op(src)?)
            .force_reference(implementation == Implementation::Reference);

        let ran = self.dispatcher.apply(&mut desc)?;

        let mut samples = Vec::with_capacity(self.repeats as usize);
        let mut total_cycles = 0u64;
        for _ in 0..self.repeats {
            let mut cycles = 0u64;
            for _ in 0..iterations {
                if let ReinitPolicy::Refill { pattern } = reinit {
                    pattern.paint(format, desc.dest.data_mut());
                }
                let start = self.counter.read();
                self.dispatcher.apply(&mut desc)?;
                cycles = cycles.wrapping_add(elapsed(start, self.counter.read()));
            }
            total_cycles = total_cycles.wrapping_add(cycles);
            samples.push(cycles as f64 / f64::from(iterations));
        }
        let output = desc.dest.data().to_vec();
        drop(desc);

        if let Some((region, offset)) = dest.first_guard_violation() {
            return Err(HarnessError::GuardViolation {
                implementation: ran,
                region,
                offset,
                params: geometry.combination(case.opacity),
            });
        }
        dest.release();

        let cycles_per_iteration = median(&mut samples);
        tracing::debug!(
            %ran,
            cycles_per_iteration,
            unit = self.counter.unit(),
            "measured"
        );
        Ok(Measurement {
            implementation: ran,
            iterations,
            repeats: self.repeats,
            total_cycles,
            cycles_per_iteration,
            cycles_per_pixel: cycles_per_iteration / geometry.pixels() as f64,
            output,
        })
    }

    pub fn compare(&self, case: &BenchCase, scenario: BenchScenario) -> HarnessResult<Comparison> {
        let reference =
            self.measure(case, scenario, Implementation::Reference, case.iterations)?;
        let accelerated =
            self.measure(case, scenario, Implementation::Accelerated, case.iterations)?;
        Ok(Comparison {
            scenario,
            geometry: BenchGeometry::for_scenario(scenario),
            reference,
            accelerated,
        })
    }

    pub fn run(&self, case: &BenchCase) -> HarnessResult<BenchResult> {
        let common = self.compare(case, BenchScenario::Common)?;
        let corner = self.compare(case, BenchScenario::Corner)?;
        tracing::info!(
            case = %case.name,
            common_speedup = common.speedup(),
            corner_speedup = corner.speedup(),
            "benchmark finished"
        );
        Ok(BenchResult {
            case: case.name.clone(),
            key: ThresholdKey {
                op: case.op,
                format: case.dest_format,
                platform: self.dispatcher.platform(),
            },
            unit: self.counter.unit(),
            common,
            corner,
        })
    }

    /// Run every case in order. A failing case is logged and yielded as its own error;
    /// later cases still run.
    pub fn run_each<'c>(
        &'c self,
        cases: &'c [BenchCase],
    ) -> impl Iterator<Item = (&'c BenchCase, HarnessResult<BenchResult>)> {
        cases.iter().map(move |case| {
            let result = self.run(case);
            if let Err(err) = &result {
                tracing::error!(case = %case.name, error = %err, "benchmark case failed");
            }
            (case, result)
        })
    }
}

fn median(samples: &mut [f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.sort_by(f64::total_cmp);
    let mid = samples.len() / 2;
    if samples.len().is_multiple_of(2) {
        (samples[mid - 1] + samples[mid]) / 2.0
    } else {
        samples[mid]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/perf/runner.rs"]
mod tests;
