use crate::blend::{BlendDescriptor, OpKind};
use crate::dispatch::registry::{ReferenceBlitter, Registry, RoutineKey};
use crate::dispatch::{BlitImplementation, Implementation, Platform};
use crate::foundation::color::ColorFormat;
use crate::foundation::error::HarnessResult;

static REFERENCE: ReferenceBlitter = ReferenceBlitter;

/// Picks and runs an implementation for each blit.
///
/// Selection fails closed: a missing routine, a masked blit or a forced reference all end up on
/// [`ReferenceBlitter`].
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Registry,
    platform: Platform,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::native()
    }
}

impl Dispatcher {
    pub fn new(registry: Registry, platform: Platform) -> Self {
        Self { registry, platform }
    }

    /// Built-in routines for the platform this binary runs on.
    pub fn native() -> Self {
        Self::new(Registry::builtin(), Platform::current())
    }

    /// A dispatcher that always selects the reference implementation.
    pub fn reference_only() -> Self {
        Self::new(Registry::empty(), Platform::current())
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn key(
        &self,
        op: OpKind,
        dest_format: ColorFormat,
        src_format: Option<ColorFormat>,
    ) -> RoutineKey {
        RoutineKey {
            op,
            dest_format,
            src_format,
            platform: self.platform,
        }
    }

    /// Whether an accelerated routine exists for this operation and format pair.
    pub fn has_accelerated(
        &self,
        op: OpKind,
        dest_format: ColorFormat,
        src_format: Option<ColorFormat>,
    ) -> bool {
        self.registry
            .lookup(&self.key(op, dest_format, src_format))
            .is_some()
    }

    /// The implementation `desc` would run on.
    pub fn select(&self, desc: &BlendDescriptor<'_>) -> &dyn BlitImplementation {
        if desc.force_reference || desc.mask.is_some() {
            return &REFERENCE;
        }
        let key = self.key(desc.kind(), desc.dest.format(), desc.op.src_format());
        match self.registry.lookup(&key) {
            Some(accelerated) => accelerated,
            None => &REFERENCE,
        }
    }

    /// Run `desc` and report which implementation handled it.
    pub fn apply(&self, desc: &mut BlendDescriptor<'_>) -> HarnessResult<Implementation> {
        let implementation = self.select(desc);
        let kind = implementation.kind();
        let op = desc.kind();
        let Some(mut job) = desc.resolve()? else {
            tracing::trace!(%op, "blend region is empty");
            return Ok(kind);
        };
        tracing::trace!(
            %op,
            routine = implementation.name(),
            width = job.width,
            height = job.height,
            "blit"
        );
        implementation.blit(&mut job)?;
        Ok(kind)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/selector.rs"]
mod tests;
