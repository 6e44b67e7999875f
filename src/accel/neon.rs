#![allow(unused_unsafe)]

use std::arch::aarch64::*;

use crate::accel::{AccelEntry, AccelRoutine, unsupported};
use crate::blend::{BlitJob, JobOp, OpKind};
use crate::foundation::color::ColorFormat;
use crate::foundation::error::HarnessResult;

pub(super) static ROUTINES: &[AccelEntry] = &[
    AccelEntry {
        op: OpKind::Fill,
        dest_format: ColorFormat::Argb8888,
        src_format: None,
        routine: AccelRoutine {
            name: "neon_fill_argb8888",
            run: fill_argb8888,
        },
    },
    AccelEntry {
        op: OpKind::Fill,
        dest_format: ColorFormat::Rgb565,
        src_format: None,
        routine: AccelRoutine {
            name: "neon_fill_rgb565",
            run: fill_rgb565,
        },
    },
];

const LANES: usize = 16;

fn splat_row(row: &mut [u8], pattern: uint8x16_t) {
    let mut chunks = row.chunks_exact_mut(LANES);
    for chunk in &mut chunks {
        // SAFETY: `chunk` is exactly 16 writable bytes; vst1q_u8 has no alignment requirement.
        unsafe { vst1q_u8(chunk.as_mut_ptr(), pattern) };
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let mut bytes = [0u8; LANES];
        // SAFETY: `bytes` is a 16-byte local.
        unsafe { vst1q_u8(bytes.as_mut_ptr(), pattern) };
        tail.copy_from_slice(&bytes[..tail.len()]);
    }
}

fn fill_argb8888(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let color = match job.op {
        JobOp::Fill { color } if job.dest_format == ColorFormat::Argb8888 && job.mask.is_none() => {
            color
        }
        _ => return Err(unsupported("neon_fill_argb8888", job)),
    };
    let px = u32::from_le_bytes(color.to_argb8888());
    // SAFETY: NEON is part of the aarch64 baseline.
    let pattern = unsafe { vreinterpretq_u8_u32(vdupq_n_u32(px)) };
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
        _ => return Err(unsupported("neon_fill_rgb565", job)),
    };
    // SAFETY: NEON is part of the aarch64 baseline.
    let pattern = unsafe { vreinterpretq_u8_u16(vdupq_n_u16(color.to_rgb565())) };
    for y in 0..job.height {
        splat_row(job.row(y).dest, pattern);
    }
    Ok(())
}
