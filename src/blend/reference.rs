//! Straightforward per-pixel blits. Every accelerated routine is judged against these.

use crate::blend::job::{BlitJob, JobOp};
use crate::foundation::color::{
    Color, ColorFormat, OPA_COVER, OPA_TRANSP, mix, mul_div255, pack_rgb565, rgb565_to_rgb888,
    unpack_rgb565,
};

/// Execute `job` one pixel at a time.
pub fn blit(job: &mut BlitJob<'_>) {
    match job.op {
        JobOp::Fill { color } => fill(job, color, OPA_COVER),
        JobOp::FillWithOpacity { color, opacity } => fill(job, color, opacity),
        JobOp::ImageComposite {
            src_format,
            opacity,
            ..
        } => composite(job, src_format, opacity),
    }
}

fn fill(job: &mut BlitJob<'_>, color: Color, opacity: u8) {
    if opacity <= OPA_TRANSP {
        return;
    }
    let format = job.dest_format;
    let px = format.pixel_size();
    for y in 0..job.height {
        let row = job.row(y);
        match row.mask {
            None if opacity >= OPA_COVER => {
                for p in row.dest.chunks_exact_mut(px) {
                    write_color(format, p, color);
                }
            }
            None => {
                for p in row.dest.chunks_exact_mut(px) {
                    mix_color(format, p, color, opacity);
                }
            }
            Some(mask) => {
                for (p, &m) in row.dest.chunks_exact_mut(px).zip(mask) {
                    mix_color(format, p, color, mul_div255(opacity, m));
                }
            }
        }
    }
}

fn composite(job: &mut BlitJob<'_>, src_format: ColorFormat, opacity: u8) {
    if opacity <= OPA_TRANSP {
        return;
    }
    let dest_format = job.dest_format;
    let (dpx, spx) = (dest_format.pixel_size(), src_format.pixel_size());
    for y in 0..job.height {
        let row = job.row(y);
        let Some(src) = row.src else {
            continue;
        };
        let pixels = row.dest.chunks_exact_mut(dpx).zip(src.chunks_exact(spx));
        match row.mask {
            None => {
                for (d, s) in pixels {
                    composite_pixel(dest_format, d, read_source(src_format, s), opacity);
                }
            }
            Some(mask) => {
                for ((d, s), &m) in pixels.zip(mask) {
                    let opa = mul_div255(opacity, m);
                    composite_pixel(dest_format, d, read_source(src_format, s), opa);
                }
            }
        }
    }
}

/// Source pixel as straight 8-bit `(r, g, b, a)`.
fn read_source(format: ColorFormat, s: &[u8]) -> (u8, u8, u8, u8) {
    match format {
        ColorFormat::Argb8888 => (s[2], s[1], s[0], s[3]),
        ColorFormat::Rgb565 => {
            let (r, g, b) = rgb565_to_rgb888(u16::from_le_bytes([s[0], s[1]]));
            (r, g, b, OPA_COVER)
        }
    }
}

fn write_color(format: ColorFormat, p: &mut [u8], color: Color) {
    match format {
        ColorFormat::Argb8888 => p.copy_from_slice(&color.to_argb8888()),
        ColorFormat::Rgb565 => p.copy_from_slice(&color.to_rgb565().to_le_bytes()),
    }
}

fn mix_color(format: ColorFormat, p: &mut [u8], color: Color, opa: u8) {
    match format {
        ColorFormat::Argb8888 => {
            for (d, c) in p.iter_mut().zip(color.to_argb8888()) {
                *d = mix(c, *d, opa);
            }
        }
        ColorFormat::Rgb565 => mix_rgb565(p, unpack_rgb565(color.to_rgb565()), opa),
    }
}

fn composite_pixel(format: ColorFormat, d: &mut [u8], (r, g, b, a): (u8, u8, u8, u8), opa: u8) {
    let a = mul_div255(a, opa);
    if a == OPA_TRANSP {
        return;
    }
    match format {
        ColorFormat::Argb8888 => {
            d[0] = mix(b, d[0], a);
            d[1] = mix(g, d[1], a);
            d[2] = mix(r, d[2], a);
            d[3] = mix(OPA_COVER, d[3], a);
        }
        ColorFormat::Rgb565 => mix_rgb565(d, (r >> 3, g >> 2, b >> 3), a),
    }
}

/// Mix 5/6/5-bit channels directly into a little-endian RGB565 pixel.
fn mix_rgb565(p: &mut [u8], (r, g, b): (u8, u8, u8), opa: u8) {
    let (dr, dg, db) = unpack_rgb565(u16::from_le_bytes([p[0], p[1]]));
    let out = pack_rgb565(mix(r, dr, opa), mix(g, dg, opa), mix(b, db, opa));
    p.copy_from_slice(&out.to_le_bytes());
}

#[cfg(test)]
#[path = "../../tests/unit/blend/reference.rs"]
mod tests;
