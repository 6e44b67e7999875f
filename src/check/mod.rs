//! Differential equivalence checking between the accelerated and reference implementations.

pub mod equivalence;
pub mod pattern;
pub mod report;

pub use equivalence::{Capture, EquivalenceCase, EquivalenceChecker};
pub use pattern::Pattern;
pub use report::{FailureRecord, SuiteReport};
