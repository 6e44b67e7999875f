use crate::foundation::color::{Color, ColorFormat};

/// Operation parameters after geometry has been resolved.
#[derive(Clone, Copy, Debug)]
pub enum JobOp<'a> {
    Fill {
        color: Color,
    },
    FillWithOpacity {
        color: Color,
        opacity: u8,
    },
    ImageComposite {
        /// Source bytes starting at the pixel that lands on the job's first destination pixel.
        src: &'a [u8],
        src_stride: usize,
        src_format: ColorFormat,
        opacity: u8,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct JobMask<'a> {
    pub data: &'a [u8],
    pub stride: usize,
}

/// A clipped, non-empty blit ready to be executed row by row.
///
/// `dest` starts at the first pixel of the effective region. Row `y` covers
/// `width * pixel_size` bytes at `y * dest_stride`; bytes between rows belong to the caller.
#[derive(Debug)]
pub struct BlitJob<'a> {
    pub dest: &'a mut [u8],
    pub dest_stride: usize,
    pub dest_format: ColorFormat,
    pub width: usize,
    pub height: usize,
    pub op: JobOp<'a>,
    pub mask: Option<JobMask<'a>>,
}

/// The slices of one job row.
pub struct JobRow<'r> {
    pub dest: &'r mut [u8],
    pub src: Option<&'r [u8]>,
    pub mask: Option<&'r [u8]>,
}

impl<'a> BlitJob<'a> {
    /// Bytes per destination row inside the region.
    pub fn row_bytes(&self) -> usize {
        self.width * self.dest_format.pixel_size()
    }

    /// Borrow destination, source and mask slices for row `y`.
    pub fn row(&mut self, y: usize) -> JobRow<'_> {
        let start = y * self.dest_stride;
        let len = self.row_bytes();
        let width = self.width;
        let src = match self.op {
            JobOp::ImageComposite {
                src,
                src_stride,
                src_format,
                ..
            } => {
                let at = y * src_stride;
                Some(&src[at..at + width * src_format.pixel_size()])
            }
            _ => None,
        };
        let mask = self.mask.map(|m| {
            let at = y * m.stride;
            &m.data[at..at + width]
        });
        JobRow {
            dest: &mut self.dest[start..start + len],
            src,
            mask,
        }
    }
}
