//! Blendcheck is a differential test and benchmark harness for pixel blitting routines.
//!
//! It proves that a hardware-accelerated blitter writes exactly the same bytes as a portable
//! scalar reference, over a combinatorial space of buffer geometries, byte misalignments and
//! opacities, and it certifies that the accelerated path stays faster by a tracked margin.
//!
//! # Pieces
//!
//! 1. **Buffers**: [`PixelBuffer`] allocates a deliberately misaligned active region framed by
//!    zeroed guard pixels; [`SurfaceMut`] and [`Surface`] are bounds-carrying row views into it.
//! 2. **Operations**: [`BlendDescriptor`] describes one fill, fill-with-opacity or image
//!    composite blit.
//! 3. **Dispatch**: [`Dispatcher`] selects the accelerated routine registered for an exact
//!    (operation, format, platform) key, or fails closed to the reference implementation.
//! 4. **Matrix**: [`for_each_combination`] walks widths, heights, strides, misalignments and
//!    non-uniformly stepped opacities.
//! 5. **Equivalence**: [`EquivalenceChecker`] runs both implementations on identically
//!    initialized buffers and reports the first guard violation or pixel mismatch.
//! 6. **Benchmarks**: [`BenchRunner`] times both implementations with a [`CycleCounter`] and
//!    [`evaluate`] holds the speedup against a [`ThresholdTable`].
//!
//! `unsafe` is denied everywhere except the SIMD routines and the time-stamp counter read.
#![deny(unsafe_code)]

mod accel;
mod blend;
mod buffer;
mod check;
mod config;
mod dispatch;
mod foundation;
mod matrix;
mod perf;

/// Named equivalence and benchmark cases.
pub mod suite;

pub use accel::{AccelEntry, AccelRoutine, RoutineFn, native_routines};
pub use blend::reference::blit as reference_blit;
pub use blend::{BlendDescriptor, BlendOp, BlitJob, JobMask, JobOp, JobRow, OpKind};
pub use buffer::{
    ALLOC_ALIGN, GUARD_PIXELS, GuardRegion, MaskView, PixelBuffer, Surface, SurfaceMut,
};
pub use check::{
    Capture, EquivalenceCase, EquivalenceChecker, FailureRecord, Pattern, SuiteReport,
};
pub use config::HarnessConfig;
pub use dispatch::{
    AcceleratedBlitter, BlitImplementation, Dispatcher, Implementation, Platform,
    ReferenceBlitter, Registry, RoutineKey,
};
pub use foundation::area::BlendArea;
pub use foundation::color::{
    Color, ColorFormat, OPA_COVER, OPA_TRANSP, mix, mul_div255, pack_rgb565, rgb565_to_rgb888,
    to_rgba8, unpack_rgb565,
};
pub use foundation::error::{HarnessError, HarnessResult};
pub use matrix::{
    Combination, OpacitySweep, OpacityValues, SourceParams, StrideSweep, Sweep,
    TestMatrixParams, count_combinations, for_each_combination,
};
#[cfg(target_arch = "x86_64")]
pub use perf::TscCounter;
pub use perf::{
    BenchCase, BenchGeometry, BenchResult, BenchRunner, BenchScenario, BenchmarkThreshold,
    Comparison, CycleCounter, DEFAULT_ITERATIONS, Measurement, MonotonicCounter, ReinitPolicy,
    ThresholdKey, ThresholdTable, Verdict, default_counter, elapsed, evaluate, speedup,
};
