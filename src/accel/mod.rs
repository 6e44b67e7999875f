//! Platform-specific blit routines.
//!
//! | Routine                  | x86_64 SSE2 | aarch64 NEON |
//! |--------------------------|-------------|--------------|
//! | fill argb8888            | yes         | yes          |
//! | fill rgb565              | yes         | yes          |
//! | fill_with_opacity argb   | yes         | -            |
//! | composite rgb565->rgb565 | yes         | -            |
//! | composite argb->argb     | yes         | -            |
//!
//! SSE2 and NEON are baseline on their targets, so no runtime feature probe is needed.
//! Every routine handles its own unaligned head and tail and never calls into the
//! reference implementation. Masks are not supported here.

#![allow(unsafe_code)]

use crate::blend::{BlitJob, OpKind};
use crate::foundation::color::ColorFormat;
use crate::foundation::error::{HarnessError, HarnessResult};

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "x86_64")]
mod x86;

/// Signature shared by all accelerated routines.
pub type RoutineFn = fn(&mut BlitJob<'_>) -> HarnessResult<()>;

/// A named accelerated routine.
#[derive(Clone, Copy)]
pub struct AccelRoutine {
    pub name: &'static str,
    pub run: RoutineFn,
}

impl std::fmt::Debug for AccelRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccelRoutine")
            .field("name", &self.name)
            .finish()
    }
}

/// One row of the built-in routine table.
#[derive(Clone, Copy, Debug)]
pub struct AccelEntry {
    pub op: OpKind,
    pub dest_format: ColorFormat,
    pub src_format: Option<ColorFormat>,
    pub routine: AccelRoutine,
}

/// Routines compiled for the current target.
pub fn native_routines() -> &'static [AccelEntry] {
    #[cfg(target_arch = "x86_64")]
    {
        x86::ROUTINES
    }
    #[cfg(target_arch = "aarch64")]
    {
        neon::ROUTINES
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        &[]
    }
}

pub(crate) fn unsupported(routine: &str, job: &BlitJob<'_>) -> HarnessError {
    HarnessError::validation(format!(
        "{routine} cannot run {:?} into {} (mask: {})",
        job.op,
        job.dest_format,
        job.mask.is_some()
    ))
}
