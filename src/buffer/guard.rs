use std::ops::Range;

use serde::Serialize;

use crate::buffer::surface::{Surface, SurfaceMut};
use crate::foundation::color::ColorFormat;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Sentinel pixels placed on each side of an active region.
pub const GUARD_PIXELS: usize = 4;

/// Alignment of the allocation start before misalignment is applied.
pub const ALLOC_ALIGN: usize = 16;

/// Memory that a blit must never modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GuardRegion {
    /// Sentinel pixels immediately before the active region.
    Leading,
    /// Sentinel pixels immediately after the active region.
    Trailing,
    /// Stride padding at the end of a row, outside the declared width.
    RowPadding { row: u32 },
}

impl std::fmt::Display for GuardRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leading => f.write_str("leading guard"),
            Self::Trailing => f.write_str("trailing guard"),
            Self::RowPadding { row } => write!(f, "padding of row {row}"),
        }
    }
}

/// A test buffer with a deliberately misaligned active region framed by zeroed guards.
///
/// Layout inside the owned storage:
///
/// ```text
/// [align slack][misalign][leading guard][active region][trailing guard]
///              ^ 16-byte aligned
/// ```
///
/// The buffer is the single owner of its storage. [`PixelBuffer::release`] consumes it, so a
/// released buffer can neither be freed twice nor read afterwards.
#[derive(Debug)]
pub struct PixelBuffer {
    storage: Vec<u8>,
    region_start: usize,
    active_len: usize,
    guard_len: usize,
    pixel_size: usize,
    misalign: usize,
}

impl PixelBuffer {
    /// Allocate `active_len` pixels of `pixel_size` bytes, shifted `misalign` bytes away from a
    /// 16-byte boundary, with `guard_len` zeroed pixels on each side.
    pub fn allocate(
        active_len: usize,
        pixel_size: usize,
        misalign: usize,
        guard_len: usize,
    ) -> HarnessResult<Self> {
        if pixel_size == 0 {
            return Err(HarnessError::validation("pixel size must be > 0"));
        }

        let overflow = || HarnessError::AllocationFailure { bytes: usize::MAX };
        let region_len = active_len
            .checked_add(guard_len.checked_mul(2).ok_or_else(overflow)?)
            .and_then(|px| px.checked_mul(pixel_size))
            .and_then(|bytes| bytes.checked_add(misalign))
            .ok_or_else(overflow)?;
        let capacity = region_len
            .checked_add(ALLOC_ALIGN - 1)
            .ok_or_else(overflow)?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| HarnessError::AllocationFailure { bytes: capacity })?;
        storage.resize(capacity, 0);

        let base = storage.as_ptr() as usize;
        let slack = (ALLOC_ALIGN - base % ALLOC_ALIGN) % ALLOC_ALIGN;

        tracing::trace!(
            active_len,
            pixel_size,
            misalign,
            guard_len,
            capacity,
            "allocated pixel buffer"
        );

        Ok(Self {
            storage,
            region_start: slack + misalign,
            active_len,
            guard_len,
            pixel_size,
            misalign,
        })
    }

    /// Allocate a buffer sized for `height` rows of `stride` pixels in `format`.
    pub fn for_rows(
        height: u32,
        stride_px: u32,
        format: ColorFormat,
        misalign: usize,
        guard_len: usize,
    ) -> HarnessResult<Self> {
        let active_len = (height as usize)
            .checked_mul(stride_px as usize)
            .ok_or(HarnessError::AllocationFailure { bytes: usize::MAX })?;
        Self::allocate(active_len, format.pixel_size(), misalign, guard_len)
    }

    fn guard_bytes(&self) -> usize {
        self.guard_len * self.pixel_size
    }

    fn active_range(&self) -> Range<usize> {
        let start = self.region_start + self.guard_bytes();
        start..start + self.active_len * self.pixel_size
    }

    /// Active region length in pixels.
    pub fn active_len(&self) -> usize {
        self.active_len
    }

    /// Guard length in pixels (per side).
    pub fn guard_len(&self) -> usize {
        self.guard_len
    }

    pub fn pixel_size(&self) -> usize {
        self.pixel_size
    }

    /// Misalignment in bytes of the leading guard relative to a 16-byte boundary.
    pub fn misalign(&self) -> usize {
        self.misalign
    }

    /// Address of the first active byte, for alignment assertions.
    pub fn active_addr(&self) -> usize {
        self.active().as_ptr() as usize
    }

    pub fn active(&self) -> &[u8] {
        &self.storage[self.active_range()]
    }

    pub fn active_mut(&mut self) -> &mut [u8] {
        let range = self.active_range();
        &mut self.storage[range]
    }

    pub fn guard_before(&self) -> &[u8] {
        let start = self.region_start;
        &self.storage[start..start + self.guard_bytes()]
    }

    pub fn guard_after(&self) -> &[u8] {
        let start = self.active_range().end;
        &self.storage[start..start + self.guard_bytes()]
    }

    /// `true` while both guards still read back as zero.
    pub fn verify_guards(&self) -> bool {
        self.first_guard_violation().is_none()
    }

    /// The first non-zero guard byte, as region plus offset within that region.
    pub fn first_guard_violation(&self) -> Option<(GuardRegion, usize)> {
        if let Some(at) = self.guard_before().iter().position(|&b| b != 0) {
            return Some((GuardRegion::Leading, at));
        }
        self.guard_after()
            .iter()
            .position(|&b| b != 0)
            .map(|at| (GuardRegion::Trailing, at))
    }

    /// Writable view of the active region as `height` rows of `stride` bytes.
    pub fn surface_mut(
        &mut self,
        width: u32,
        height: u32,
        stride: usize,
        format: ColorFormat,
    ) -> HarnessResult<SurfaceMut<'_>> {
        self.check_format(format)?;
        SurfaceMut::new(self.active_mut(), width, height, stride, format)
    }

    /// Read-only view of the active region as `height` rows of `stride` bytes.
    pub fn surface(
        &self,
        width: u32,
        height: u32,
        stride: usize,
        format: ColorFormat,
    ) -> HarnessResult<Surface<'_>> {
        self.check_format(format)?;
        Surface::new(self.active(), width, height, stride, format)
    }

    fn check_format(&self, format: ColorFormat) -> HarnessResult<()> {
        if format.pixel_size() != self.pixel_size {
            return Err(HarnessError::validation(format!(
                "{format} needs {} byte pixels, buffer holds {} byte pixels",
                format.pixel_size(),
                self.pixel_size
            )));
        }
        Ok(())
    }

    /// Free the underlying allocation.
    pub fn release(self) {
        tracing::trace!(bytes = self.storage.len(), "released pixel buffer");
        drop(self.storage);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/guard.rs"]
mod tests;
