use serde::{Deserialize, Serialize};

use crate::blend::job::{BlitJob, JobMask, JobOp};
use crate::buffer::{MaskView, Surface, SurfaceMut};
use crate::foundation::area::BlendArea;
use crate::foundation::color::{Color, ColorFormat};
use crate::foundation::error::{HarnessError, HarnessResult};

/// The fundamental blit operations.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Fill,
    FillWithOpacity,
    ImageComposite,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Fill => "fill",
            Self::FillWithOpacity => "fill_with_opacity",
            Self::ImageComposite => "image_composite",
        })
    }
}

/// What to write into the destination area.
#[derive(Clone, Copy, Debug)]
pub enum BlendOp<'a> {
    /// Replace every pixel with `color` (opacity forced to max).
    Fill { color: Color },
    /// Mix `color` over the destination with `opacity`.
    FillWithOpacity { color: Color, opacity: u8 },
    /// Alpha-composite `src` over the destination; `src` (0,0) maps to the area's top-left.
    ImageComposite { src: Surface<'a>, opacity: u8 },
}

impl BlendOp<'_> {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Fill { .. } => OpKind::Fill,
            Self::FillWithOpacity { .. } => OpKind::FillWithOpacity,
            Self::ImageComposite { .. } => OpKind::ImageComposite,
        }
    }

    pub fn src_format(&self) -> Option<ColorFormat> {
        match self {
            Self::ImageComposite { src, .. } => Some(src.format()),
            _ => None,
        }
    }
}

/// Everything one blit call needs: destination rows, target area, operation, optional mask.
///
/// Two descriptors built for a differential check differ only in `dest` and
/// `force_reference`.
#[derive(Debug)]
pub struct BlendDescriptor<'a> {
    pub dest: SurfaceMut<'a>,
    pub area: BlendArea,
    pub clip: Option<BlendArea>,
    pub op: BlendOp<'a>,
    pub mask: Option<MaskView<'a>>,
    pub force_reference: bool,
}

impl<'a> BlendDescriptor<'a> {
    /// A descriptor covering the whole destination surface.
    pub fn new(dest: SurfaceMut<'a>, op: BlendOp<'a>) -> Self {
        let area = BlendArea::from_size(dest.width(), dest.height());
        Self {
            dest,
            area,
            clip: None,
            op,
            mask: None,
            force_reference: false,
        }
    }

    pub fn with_area(mut self, area: BlendArea) -> Self {
        self.area = area;
        self
    }

    pub fn with_clip(mut self, clip: BlendArea) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_mask(mut self, mask: MaskView<'a>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn force_reference(mut self, force: bool) -> Self {
        self.force_reference = force;
        self
    }

    pub fn kind(&self) -> OpKind {
        self.op.kind()
    }

    /// Clip the area against the clip rect and surface bounds and slice out the rows to touch.
    ///
    /// `Ok(None)` means the effective region is empty and the blit is a no-op.
    pub(crate) fn resolve(&mut self) -> HarnessResult<Option<BlitJob<'_>>> {
        let bounds = BlendArea::from_size(self.dest.width(), self.dest.height());
        let mut region = self.area.intersect(&bounds);
        if let Some(clip) = self.clip {
            region = region.and_then(|r| r.intersect(&clip));
        }

        let (area_w, area_h) = (self.area.width(), self.area.height());
        if let BlendOp::ImageComposite { src, .. } = &self.op
            && (src.width() < area_w || src.height() < area_h)
        {
            return Err(HarnessError::validation(format!(
                "source {}x{} does not cover blend area {area_w}x{area_h}",
                src.width(),
                src.height()
            )));
        }
        if let Some(mask) = &self.mask
            && (mask.width() < area_w || mask.height() < area_h)
        {
            return Err(HarnessError::validation(format!(
                "mask {}x{} does not cover blend area {area_w}x{area_h}",
                mask.width(),
                mask.height()
            )));
        }

        let Some(region) = region else {
            return Ok(None);
        };

        // Offsets of the clipped region inside the area, shared by source and mask.
        let ox = (i64::from(region.x1) - i64::from(self.area.x1)) as usize;
        let oy = (i64::from(region.y1) - i64::from(self.area.y1)) as usize;

        let op = match self.op {
            BlendOp::Fill { color } => JobOp::Fill { color },
            BlendOp::FillWithOpacity { color, opacity } => {
                JobOp::FillWithOpacity { color, opacity }
            }
            BlendOp::ImageComposite { src, opacity } => {
                let start = oy * src.stride() + ox * src.format().pixel_size();
                JobOp::ImageComposite {
                    src: &src.data()[start..],
                    src_stride: src.stride(),
                    src_format: src.format(),
                    opacity,
                }
            }
        };

        let mask = self.mask.map(|m| JobMask {
            data: &m.data()[oy * m.stride() + ox..],
            stride: m.stride(),
        });

        let dest_format = self.dest.format();
        let dest_stride = self.dest.stride();
        let start = region.y1 as usize * dest_stride + region.x1 as usize * dest_format.pixel_size();

        Ok(Some(BlitJob {
            dest: &mut self.dest.data_mut()[start..],
            dest_stride,
            dest_format,
            width: region.width() as usize,
            height: region.height() as usize,
            op,
            mask,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/descriptor.rs"]
mod tests;
