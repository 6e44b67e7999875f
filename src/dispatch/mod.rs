//! Routine selection: which implementation runs a given blit.

pub mod registry;
pub mod selector;

use serde::{Deserialize, Serialize};

pub use registry::{AcceleratedBlitter, ReferenceBlitter, Registry, RoutineKey};
pub use selector::Dispatcher;

use crate::blend::BlitJob;
use crate::foundation::error::HarnessResult;

/// Which side of a differential comparison produced some output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implementation {
    Reference,
    Accelerated,
}

impl std::fmt::Display for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Accelerated => "accelerated",
        })
    }
}

/// Target families the routine table distinguishes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    X86_64,
    Aarch64,
    Portable,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(target_arch = "x86_64") {
            Self::X86_64
        } else if cfg!(target_arch = "aarch64") {
            Self::Aarch64
        } else {
            Self::Portable
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Portable => "portable",
        })
    }
}

/// Something that can execute a resolved blit.
pub trait BlitImplementation: Send + Sync {
    fn kind(&self) -> Implementation;

    fn name(&self) -> &'static str;

    fn blit(&self, job: &mut BlitJob<'_>) -> HarnessResult<()>;
}
