use crate::foundation::color::ColorFormat;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Bytes needed to hold `height` rows of `stride` bytes when only the last row's declared
/// width has to exist.
pub(crate) fn required_len(width: u32, height: u32, stride: usize, pixel_size: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    (height as usize - 1) * stride + width as usize * pixel_size
}

fn validate(
    what: &str,
    len: usize,
    width: u32,
    height: u32,
    stride: usize,
    pixel_size: usize,
) -> HarnessResult<()> {
    let row = width as usize * pixel_size;
    if stride < row {
        return Err(HarnessError::validation(format!(
            "{what} stride {stride} is smaller than a row of {width} px ({row} bytes)"
        )));
    }
    let need = required_len(width, height, stride, pixel_size);
    if len < need {
        return Err(HarnessError::validation(format!(
            "{what} of {width}x{height} with stride {stride} needs {need} bytes, got {len}"
        )));
    }
    Ok(())
}

/// Writable, bounds-carrying pixel rows.
#[derive(Debug)]
pub struct SurfaceMut<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
    format: ColorFormat,
}

impl<'a> SurfaceMut<'a> {
    /// Wrap `data` as `height` rows of `stride` bytes, each holding `width` pixels.
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: ColorFormat,
    ) -> HarnessResult<Self> {
        validate(
            "surface",
            data.len(),
            width,
            height,
            stride,
            format.pixel_size(),
        )?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &*self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }
}

/// Read-only, bounds-carrying pixel rows.
#[derive(Clone, Copy, Debug)]
pub struct Surface<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
    format: ColorFormat,
}

impl<'a> Surface<'a> {
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: ColorFormat,
    ) -> HarnessResult<Self> {
        validate(
            "source",
            data.len(),
            width,
            height,
            stride,
            format.pixel_size(),
        )?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// 8-bit coverage values, one per pixel, aligned with the blend area's top-left corner.
#[derive(Clone, Copy, Debug)]
pub struct MaskView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> MaskView<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: usize) -> HarnessResult<Self> {
        validate("mask", data.len(), width, height, stride, 1)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/surface.rs"]
mod tests;
