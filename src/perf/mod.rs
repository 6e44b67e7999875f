//! Cycle-counted benchmarks and the regression threshold table.

pub mod counter;
pub mod runner;
pub mod threshold;

#[cfg(target_arch = "x86_64")]
pub use counter::TscCounter;
pub use counter::{CycleCounter, MonotonicCounter, default_counter, elapsed};
pub use runner::{
    BenchCase, BenchGeometry, BenchResult, BenchRunner, Comparison, DEFAULT_ITERATIONS,
    Measurement, ReinitPolicy, Verdict, evaluate, speedup,
};
pub use threshold::{BenchScenario, BenchmarkThreshold, ThresholdKey, ThresholdTable};
