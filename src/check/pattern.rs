use serde::{Deserialize, Serialize};

use crate::foundation::color::{Color, ColorFormat};

/// Deterministic initial contents for a test buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    /// Pixel `i` holds the integer value `i mod 255`.
    IndexRamp,
    /// Every pixel holds `color` with alpha `alpha` (alpha ignored for RGB565).
    Background { color: Color, alpha: u8 },
    /// Byte `j` holds `2j mod 256`.
    EvenBytes,
    /// Byte `j` holds `(2j + 1) mod 256`.
    OddBytes,
    /// `color` with per-pixel alpha `i mod 255`; RGB565 pixels are XORed with `i` instead.
    DynamicAlpha { color: Color },
    /// All bytes zero.
    Zero,
}

impl Pattern {
    /// Overwrite `data` (whole pixels of `format`) with this pattern.
    pub fn paint(&self, format: ColorFormat, data: &mut [u8]) {
        let px = format.pixel_size();
        match *self {
            Self::IndexRamp => {
                for (i, p) in data.chunks_exact_mut(px).enumerate() {
                    p.fill(0);
                    p[0] = (i % 255) as u8;
                }
            }
            Self::Background { color, alpha } => {
                let bytes = background_bytes(format, color, alpha);
                for p in data.chunks_exact_mut(px) {
                    p.copy_from_slice(&bytes[..px]);
                }
            }
            Self::EvenBytes => {
                for (j, b) in data.iter_mut().enumerate() {
                    *b = (j * 2) as u8;
                }
            }
            Self::OddBytes => {
                for (j, b) in data.iter_mut().enumerate() {
                    *b = (j * 2 + 1) as u8;
                }
            }
            Self::DynamicAlpha { color } => {
                for (i, p) in data.chunks_exact_mut(px).enumerate() {
                    match format {
                        ColorFormat::Argb8888 => {
                            p.copy_from_slice(&background_bytes(format, color, (i % 255) as u8));
                        }
                        ColorFormat::Rgb565 => {
                            let v = color.to_rgb565() ^ (i as u16);
                            p.copy_from_slice(&v.to_le_bytes());
                        }
                    }
                }
            }
            Self::Zero => data.fill(0),
        }
    }
}

fn background_bytes(format: ColorFormat, color: Color, alpha: u8) -> [u8; 4] {
    match format {
        ColorFormat::Argb8888 => [color.b, color.g, color.r, alpha],
        ColorFormat::Rgb565 => {
            let [lo, hi] = color.to_rgb565().to_le_bytes();
            [lo, hi, 0, 0]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/check/pattern.rs"]
mod tests;
