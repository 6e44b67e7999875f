//! Blit descriptors and the scalar reference implementation.

pub mod descriptor;
pub mod job;
pub mod reference;

pub use descriptor::{BlendDescriptor, BlendOp, OpKind};
pub use job::{BlitJob, JobMask, JobOp, JobRow};
