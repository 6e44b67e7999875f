use std::collections::BTreeMap;

use serde::Serialize;

use crate::accel::{self, AccelRoutine};
use crate::blend::{BlitJob, OpKind, reference};
use crate::dispatch::{BlitImplementation, Implementation, Platform};
use crate::foundation::color::ColorFormat;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Selection key of an accelerated routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoutineKey {
    pub op: OpKind,
    pub dest_format: ColorFormat,
    pub src_format: Option<ColorFormat>,
    pub platform: Platform,
}

impl std::fmt::Display for RoutineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.src_format {
            Some(src) => write!(f, "{}/{src}->{}/{}", self.op, self.dest_format, self.platform),
            None => write!(f, "{}/{}/{}", self.op, self.dest_format, self.platform),
        }
    }
}

/// The scalar per-pixel implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceBlitter;

impl BlitImplementation for ReferenceBlitter {
    fn kind(&self) -> Implementation {
        Implementation::Reference
    }

    fn name(&self) -> &'static str {
        "reference"
    }

    fn blit(&self, job: &mut BlitJob<'_>) -> HarnessResult<()> {
        reference::blit(job);
        Ok(())
    }
}

/// A platform routine from the accelerated table.
#[derive(Clone, Copy, Debug)]
pub struct AcceleratedBlitter {
    routine: AccelRoutine,
}

impl AcceleratedBlitter {
    pub fn new(routine: AccelRoutine) -> Self {
        Self { routine }
    }
}

impl BlitImplementation for AcceleratedBlitter {
    fn kind(&self) -> Implementation {
        Implementation::Accelerated
    }

    fn name(&self) -> &'static str {
        self.routine.name
    }

    fn blit(&self, job: &mut BlitJob<'_>) -> HarnessResult<()> {
        (self.routine.run)(job)
    }
}

/// Accelerated routines by key. Anything not in here runs on the reference implementation.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    routines: BTreeMap<RoutineKey, AcceleratedBlitter>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The routines compiled for the current target.
    pub fn builtin() -> Self {
        let platform = Platform::current();
        let mut routines = BTreeMap::new();
        for entry in accel::native_routines() {
            let key = RoutineKey {
                op: entry.op,
                dest_format: entry.dest_format,
                src_format: entry.src_format,
                platform,
            };
            routines.insert(key, AcceleratedBlitter::new(entry.routine));
        }
        Self { routines }
    }

    /// Add a routine. Registering a key twice is a setup error.
    pub fn register(&mut self, key: RoutineKey, routine: AccelRoutine) -> HarnessResult<()> {
        if self.routines.contains_key(&key) {
            return Err(HarnessError::validation(format!(
                "routine for {key} registered twice"
            )));
        }
        self.routines.insert(key, AcceleratedBlitter::new(routine));
        Ok(())
    }

    pub fn lookup(&self, key: &RoutineKey) -> Option<&AcceleratedBlitter> {
        self.routines.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RoutineKey> {
        self.routines.keys()
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/registry.rs"]
mod tests;
