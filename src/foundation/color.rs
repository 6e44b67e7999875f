use serde::{Deserialize, Serialize};

use crate::foundation::error::{HarnessError, HarnessResult};

/// Destination and source pixel layouts the harness knows how to blit.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    /// 32-bit, memory order B, G, R, A.
    Argb8888,
    /// 16-bit little-endian, R in the top five bits, no alpha.
    Rgb565,
}

impl ColorFormat {
    /// Bytes per pixel.
    pub const fn pixel_size(self) -> usize {
        match self {
            Self::Argb8888 => 4,
            Self::Rgb565 => 2,
        }
    }

    /// Read the pixel at byte offset `at` as an integer (little-endian).
    pub fn read_pixel(self, bytes: &[u8], at: usize) -> u32 {
        match self {
            Self::Argb8888 => u32::from_le_bytes([
                bytes[at],
                bytes[at + 1],
                bytes[at + 2],
                bytes[at + 3],
            ]),
            Self::Rgb565 => u32::from(u16::from_le_bytes([bytes[at], bytes[at + 1]])),
        }
    }
}

impl std::fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Argb8888 => "argb8888",
            Self::Rgb565 => "rgb565",
        })
    }
}

/// An opaque 24-bit color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Memory layout of this color as an opaque ARGB8888 pixel.
    pub const fn to_argb8888(self) -> [u8; 4] {
        [self.b, self.g, self.r, 0xFF]
    }

    /// Packed RGB565 value (channels truncated).
    pub const fn to_rgb565(self) -> u16 {
        pack_rgb565(self.r >> 3, self.g >> 2, self.b >> 3)
    }
}

pub const OPA_TRANSP: u8 = 0;
pub const OPA_COVER: u8 = 255;

/// `(a * b + 127) / 255`, the rounding product shared by every blend path.
#[inline]
pub fn mul_div255(a: u8, b: u8) -> u8 {
    ((u32::from(a) * u32::from(b) + 127) / 255) as u8
}

/// Linear mix of `fg` over `bg` with weight `opa`, rounded to nearest.
///
/// `mix(fg, bg, o) == mix(bg, fg, 255 - o)` for every input.
#[inline]
pub fn mix(fg: u8, bg: u8, opa: u8) -> u8 {
    let o = u32::from(opa);
    ((u32::from(fg) * o + u32::from(bg) * (255 - o) + 127) / 255) as u8
}

#[inline]
pub const fn pack_rgb565(r5: u8, g6: u8, b5: u8) -> u16 {
    ((r5 as u16 & 0x1F) << 11) | ((g6 as u16 & 0x3F) << 5) | (b5 as u16 & 0x1F)
}

/// Split a packed RGB565 value into its 5/6/5-bit channels.
#[inline]
pub const fn unpack_rgb565(px: u16) -> (u8, u8, u8) {
    (
        ((px >> 11) & 0x1F) as u8,
        ((px >> 5) & 0x3F) as u8,
        (px & 0x1F) as u8,
    )
}

/// Expand an RGB565 value to 8-bit channels by bit replication.
#[inline]
pub const fn rgb565_to_rgb888(px: u16) -> (u8, u8, u8) {
    let (r, g, b) = unpack_rgb565(px);
    ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
}

/// Convert `height` rows of pixels into tightly packed straight RGBA8 for image dumps.
///
/// The last row may end right after its pixels; every other row needs a full `stride`.
pub fn to_rgba8(
    format: ColorFormat,
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> HarnessResult<Vec<u8>> {
    let px = format.pixel_size();
    let row_bytes = width as usize * px;
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }
    if stride < row_bytes {
        return Err(HarnessError::validation(format!(
            "stride {stride} is shorter than a {width}px {format} row ({row_bytes} bytes)"
        )));
    }
    let needed = (height as usize - 1) * stride + row_bytes;
    if data.len() < needed {
        return Err(HarnessError::validation(format!(
            "{} bytes cannot hold {height} rows of stride {stride}; need {needed}",
            data.len()
        )));
    }

    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as usize {
        let row = &data[y * stride..y * stride + row_bytes];
        for p in row.chunks_exact(px) {
            match format {
                ColorFormat::Argb8888 => out.extend_from_slice(&[p[2], p[1], p[0], p[3]]),
                ColorFormat::Rgb565 => {
                    let (r, g, b) = rgb565_to_rgb888(u16::from_le_bytes([p[0], p[1]]));
                    out.extend_from_slice(&[r, g, b, 0xFF]);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
