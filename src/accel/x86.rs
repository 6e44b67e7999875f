#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use crate::accel::{AccelEntry, AccelRoutine, unsupported};
use crate::blend::{BlitJob, JobOp, OpKind};
use crate::foundation::color::{ColorFormat, OPA_COVER, OPA_TRANSP};
use crate::foundation::error::HarnessResult;

pub(super) static ROUTINES: &[AccelEntry] = &[
    AccelEntry {
        op: OpKind::Fill,
        dest_format: ColorFormat::Argb8888,
        src_format: None,
        routine: AccelRoutine {
            name: "sse2_fill_argb8888",
            run: fill_argb8888,
        },
    },
    AccelEntry {
        op: OpKind::Fill,
        dest_format: ColorFormat::Rgb565,
        src_format: None,
        routine: AccelRoutine {
            name: "sse2_fill_rgb565",
            run: fill_rgb565,
        },
    },
    AccelEntry {
        op: OpKind::FillWithOpacity,
        dest_format: ColorFormat::Argb8888,
        src_format: None,
        routine: AccelRoutine {
            name: "sse2_fill_opa_argb8888",
            run: fill_opa_argb8888,
        },
    },
    AccelEntry {
        op: OpKind::ImageComposite,
        dest_format: ColorFormat::Rgb565,
        src_format: Some(ColorFormat::Rgb565),
        routine: AccelRoutine {
            name: "sse2_image_rgb565",
            run: image_rgb565,
        },
    },
    AccelEntry {
        op: OpKind::ImageComposite,
        dest_format: ColorFormat::Argb8888,
        src_format: Some(ColorFormat::Argb8888),
        routine: AccelRoutine {
            name: "sse2_image_argb8888",
            run: image_argb8888,
        },
    },
];

const LANES: usize = 16;

/// Store `pattern` across `row`, which must start on a pixel boundary.
fn splat_row(row: &mut [u8], pattern: __m128i) {
    let mut chunks = row.chunks_exact_mut(LANES);
    for chunk in &mut chunks {
        // SAFETY: `chunk` is exactly 16 writable bytes and storeu has no alignment requirement.
        unsafe { _mm_storeu_si128(chunk.as_mut_ptr().cast::<__m128i>(), pattern) };
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let mut bytes = [0u8; LANES];
        // SAFETY: `bytes` is a 16-byte local.
        unsafe { _mm_storeu_si128(bytes.as_mut_ptr().cast::<__m128i>(), pattern) };
        tail.copy_from_slice(&bytes[..tail.len()]);
    }
}

/// `floor(t / 255)` per u16 lane, exact for every `t <= 65534`.
#[inline(always)]
fn div255(t: __m128i) -> __m128i {
    // SAFETY: SSE2 is part of the x86_64 baseline.
    unsafe {
        let one = _mm_set1_epi16(1);
        _mm_srli_epi16::<8>(_mm_add_epi16(_mm_add_epi16(t, one), _mm_srli_epi16::<8>(t)))
    }
}

#[inline(always)]
fn load(bytes: &[u8]) -> __m128i {
    debug_assert!(bytes.len() >= LANES);
    // SAFETY: callers pass slices of at least 16 bytes; loadu is unaligned.
    unsafe { _mm_loadu_si128(bytes.as_ptr().cast::<__m128i>()) }
}

#[inline(always)]
fn store(bytes: &mut [u8], v: __m128i) {
    debug_assert!(bytes.len() >= LANES);
    // SAFETY: callers pass slices of at least 16 bytes; storeu is unaligned.
    unsafe { _mm_storeu_si128(bytes.as_mut_ptr().cast::<__m128i>(), v) }
}

#[inline(always)]
fn mix_scalar(fg: u8, bg: u8, opa: u16) -> u8 {
    ((u32::from(fg) * u32::from(opa) + u32::from(bg) * u32::from(255 - opa) + 127) / 255) as u8
}

fn fill_argb8888(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let color = match job.op {
        JobOp::Fill { color } if job.dest_format == ColorFormat::Argb8888 && job.mask.is_none() => {
            color
        }
        _ => return Err(unsupported("sse2_fill_argb8888", job)),
    };
    let px = u32::from_le_bytes(color.to_argb8888());
    // SAFETY: SSE2 is part of the x86_64 baseline.
    let pattern = unsafe { _mm_set1_epi32(px as i32) };
    for y in 0..job.height {
        splat_row(job.row(y).dest, pattern);
    }
    Ok(())
}

fn fill_rgb565(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let color = match job.op {
        JobOp::Fill { color } if job.dest_format == ColorFormat::Rgb565 && job.mask.is_none() => {
            color
        }
        _ => return Err(unsupported("sse2_fill_rgb565", job)),
    };
    // SAFETY: SSE2 is part of the x86_64 baseline.
    let pattern = unsafe { _mm_set1_epi16(color.to_rgb565() as i16) };
    for y in 0..job.height {
        splat_row(job.row(y).dest, pattern);
    }
    Ok(())
}

fn fill_opa_argb8888(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let (color, opacity) = match job.op {
        JobOp::FillWithOpacity { color, opacity }
            if job.dest_format == ColorFormat::Argb8888 && job.mask.is_none() =>
        {
            (color, opacity)
        }
        _ => return Err(unsupported("sse2_fill_opa_argb8888", job)),
    };
    if opacity == OPA_TRANSP {
        return Ok(());
    }
    if opacity == OPA_COVER {
        let px = u32::from_le_bytes(color.to_argb8888());
        // SAFETY: SSE2 is part of the x86_64 baseline.
        let pattern = unsafe { _mm_set1_epi32(px as i32) };
        for y in 0..job.height {
            splat_row(job.row(y).dest, pattern);
        }
        return Ok(());
    }

    let o = u16::from(opacity);
    let inv = 255 - o;
    let c = color.to_argb8888();
    // Per channel `c * o + 127`, two pixels per register.
    let t = c.map(|ch| (u16::from(ch) * o + 127) as i16);
    // SAFETY: SSE2 is part of the x86_64 baseline.
    let (zero, vinv, fg) = unsafe {
        (
            _mm_setzero_si128(),
            _mm_set1_epi16(inv as i16),
            _mm_setr_epi16(t[0], t[1], t[2], t[3], t[0], t[1], t[2], t[3]),
        )
    };

    for y in 0..job.height {
        let row = job.row(y).dest;
        let mut chunks = row.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            let d = load(chunk);
            // SAFETY: SSE2 is part of the x86_64 baseline.
            let out = unsafe {
                let lo = _mm_unpacklo_epi8(d, zero);
                let hi = _mm_unpackhi_epi8(d, zero);
                let lo = div255(_mm_add_epi16(_mm_mullo_epi16(lo, vinv), fg));
                let hi = div255(_mm_add_epi16(_mm_mullo_epi16(hi, vinv), fg));
                _mm_packus_epi16(lo, hi)
            };
            store(chunk, out);
        }
        for p in chunks.into_remainder().chunks_exact_mut(4) {
            for (d, ch) in p.iter_mut().zip(c) {
                *d = mix_scalar(ch, *d, o);
            }
        }
    }
    Ok(())
}

fn image_rgb565(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let opacity = match job.op {
        JobOp::ImageComposite {
            src_format: ColorFormat::Rgb565,
            opacity,
            ..
        } if job.dest_format == ColorFormat::Rgb565 && job.mask.is_none() => opacity,
        _ => return Err(unsupported("sse2_image_rgb565", job)),
    };
    if opacity == OPA_TRANSP {
        return Ok(());
    }

    let o = u16::from(opacity);
    let inv = 255 - o;
    // SAFETY: SSE2 is part of the x86_64 baseline.
    let (vo, vinv, bias, m5, m6) = unsafe {
        (
            _mm_set1_epi16(o as i16),
            _mm_set1_epi16(inv as i16),
            _mm_set1_epi16(127),
            _mm_set1_epi16(0x1F),
            _mm_set1_epi16(0x3F),
        )
    };

    for y in 0..job.height {
        let row = job.row(y);
        let (dest, Some(src)) = (row.dest, row.src) else {
            continue;
        };
        if opacity == OPA_COVER {
            let mut d_chunks = dest.chunks_exact_mut(LANES);
            let mut s_chunks = src.chunks_exact(LANES);
            for (d, s) in (&mut d_chunks).zip(&mut s_chunks) {
                store(d, load(s));
            }
            d_chunks
                .into_remainder()
                .copy_from_slice(s_chunks.remainder());
            continue;
        }

        let mut d_chunks = dest.chunks_exact_mut(LANES);
        let mut s_chunks = src.chunks_exact(LANES);
        for (d, s) in (&mut d_chunks).zip(&mut s_chunks) {
            let sv = load(s);
            let dv = load(d);
            // SAFETY: SSE2 is part of the x86_64 baseline.
            let out = unsafe {
                let mix = |sc: __m128i, dc: __m128i| {
                    div255(_mm_add_epi16(
                        _mm_add_epi16(_mm_mullo_epi16(sc, vo), _mm_mullo_epi16(dc, vinv)),
                        bias,
                    ))
                };
                let r = mix(_mm_srli_epi16::<11>(sv), _mm_srli_epi16::<11>(dv));
                let g = mix(
                    _mm_and_si128(_mm_srli_epi16::<5>(sv), m6),
                    _mm_and_si128(_mm_srli_epi16::<5>(dv), m6),
                );
                let b = mix(_mm_and_si128(sv, m5), _mm_and_si128(dv, m5));
                _mm_or_si128(
                    _mm_or_si128(_mm_slli_epi16::<11>(r), _mm_slli_epi16::<5>(g)),
                    b,
                )
            };
            store(d, out);
        }
        for (d, s) in d_chunks
            .into_remainder()
            .chunks_exact_mut(2)
            .zip(s_chunks.remainder().chunks_exact(2))
        {
            let sp = u16::from_le_bytes([s[0], s[1]]);
            let dp = u16::from_le_bytes([d[0], d[1]]);
            let ch = |px: u16, shift: u16, mask: u16| ((px >> shift) & mask) as u8;
            let r = mix_scalar(ch(sp, 11, 0x1F), ch(dp, 11, 0x1F), o);
            let g = mix_scalar(ch(sp, 5, 0x3F), ch(dp, 5, 0x3F), o);
            let b = mix_scalar(ch(sp, 0, 0x1F), ch(dp, 0, 0x1F), o);
            let out = (u16::from(r) << 11) | (u16::from(g) << 5) | u16::from(b);
            d.copy_from_slice(&out.to_le_bytes());
        }
    }
    Ok(())
}

fn image_argb8888(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let opacity = match job.op {
        JobOp::ImageComposite {
            src_format: ColorFormat::Argb8888,
            opacity,
            ..
        } if job.dest_format == ColorFormat::Argb8888 && job.mask.is_none() => opacity,
        _ => return Err(unsupported("sse2_image_argb8888", job)),
    };
    if opacity == OPA_TRANSP {
        return Ok(());
    }

    let o = u16::from(opacity);
    // SAFETY: SSE2 is part of the x86_64 baseline.
    let (zero, vo, bias, v255, alpha_lanes) = unsafe {
        (
            _mm_setzero_si128(),
            _mm_set1_epi16(o as i16),
            _mm_set1_epi16(127),
            _mm_set1_epi16(255),
            _mm_setr_epi16(0, 0, 0, 255, 0, 0, 0, 255),
        )
    };

    // Two pixels widened to u16 lanes: B G R A B G R A.
    let blend_half = |s: __m128i, d: __m128i| -> __m128i {
        // SAFETY: SSE2 is part of the x86_64 baseline.
        unsafe {
            let sa = _mm_shufflehi_epi16::<0xFF>(_mm_shufflelo_epi16::<0xFF>(s));
            let a = div255(_mm_add_epi16(_mm_mullo_epi16(sa, vo), bias));
            let inv = _mm_sub_epi16(v255, a);
            // The destination alpha moves toward opaque with the same weight.
            let s = _mm_or_si128(s, alpha_lanes);
            div255(_mm_add_epi16(
                _mm_add_epi16(_mm_mullo_epi16(s, a), _mm_mullo_epi16(d, inv)),
                bias,
            ))
        }
    };

    for y in 0..job.height {
        let row = job.row(y);
        let (dest, Some(src)) = (row.dest, row.src) else {
            continue;
        };
        let mut d_chunks = dest.chunks_exact_mut(LANES);
        let mut s_chunks = src.chunks_exact(LANES);
        for (d, s) in (&mut d_chunks).zip(&mut s_chunks) {
            let sv = load(s);
            let dv = load(d);
            // SAFETY: SSE2 is part of the x86_64 baseline.
            let out = unsafe {
                let lo = blend_half(_mm_unpacklo_epi8(sv, zero), _mm_unpacklo_epi8(dv, zero));
                let hi = blend_half(_mm_unpackhi_epi8(sv, zero), _mm_unpackhi_epi8(dv, zero));
                _mm_packus_epi16(lo, hi)
            };
            store(d, out);
        }
        for (d, s) in d_chunks
            .into_remainder()
            .chunks_exact_mut(4)
            .zip(s_chunks.remainder().chunks_exact(4))
        {
            let a = ((u32::from(s[3]) * u32::from(o) + 127) / 255) as u16;
            d[0] = mix_scalar(s[0], d[0], a);
            d[1] = mix_scalar(s[1], d[1], a);
            d[2] = mix_scalar(s[2], d[2], a);
            d[3] = mix_scalar(OPA_COVER, d[3], a);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/accel/x86.rs"]
mod tests;
