//! The named equivalence and benchmark cases the CLI and integration tests run.

use crate::blend::OpKind;
use crate::check::{EquivalenceCase, Pattern};
use crate::foundation::color::{Color, ColorFormat};
use crate::matrix::{OpacitySweep, SourceParams, StrideSweep, Sweep, TestMatrixParams};
use crate::perf::{BenchCase, DEFAULT_ITERATIONS, ReinitPolicy};

pub const FOREGROUND: Color = Color::new(0x12, 0x34, 0x56);
pub const BACKGROUND: Color = Color::new(0xAB, 0xCD, 0xEF);

/// An equivalence case with its exhaustive and its reduced matrix.
#[derive(Clone, Debug)]
pub struct SuiteCase {
    pub case: EquivalenceCase,
    pub full: TestMatrixParams,
    pub quick: TestMatrixParams,
}

impl SuiteCase {
    pub fn name(&self) -> &str {
        &self.case.name
    }

    pub fn params(&self, quick: bool) -> &TestMatrixParams {
        if quick { &self.quick } else { &self.full }
    }
}

const OPAQUE: OpacitySweep = OpacitySweep::fixed(255);

fn fill_matrix(quick: bool) -> TestMatrixParams {
    TestMatrixParams {
        width: if quick { Sweep::new(1, 12, 1) } else { Sweep::new(1, 24, 1) },
        height: if quick { Sweep::new(1, 3, 1) } else { Sweep::new(1, 16, 1) },
        stride: StrideSweep::Extra {
            max_extra: if quick { 2 } else { 5 },
            step: 1,
        },
        misalign: if quick { Sweep::new(0, 3, 1) } else { Sweep::new(0, 16, 1) },
        source: None,
        bg_opa: OPAQUE,
        fg_opa: OPAQUE,
    }
}

fn fill_opa_matrix(quick: bool) -> TestMatrixParams {
    TestMatrixParams {
        width: if quick { Sweep::new(1, 9, 1) } else { Sweep::new(8, 16, 1) },
        height: if quick { Sweep::fixed(2) } else { Sweep::new(1, 16, 1) },
        stride: if quick {
            StrideSweep::Padded { extra: 1 }
        } else {
            StrideSweep::Tight
        },
        misalign: if quick { Sweep::new(0, 3, 3) } else { Sweep::fixed(0) },
        source: None,
        bg_opa: OpacitySweep::full(),
        fg_opa: OpacitySweep::full(),
    }
}

fn image_quick_matrix(opacity: OpacitySweep) -> TestMatrixParams {
    TestMatrixParams {
        width: Sweep::new(1, 10, 3),
        height: Sweep::fixed(2),
        stride: StrideSweep::Extra {
            max_extra: 2,
            step: 2,
        },
        misalign: Sweep::new(0, 2, 1),
        source: Some(SourceParams {
            stride: StrideSweep::Extra {
                max_extra: 1,
                step: 1,
            },
            misalign: Sweep::new(0, 1, 1),
        }),
        bg_opa: OPAQUE,
        fg_opa: opacity,
    }
}

/// Opaque copy: every stride up to twice the width on both sides.
fn image_matrix(quick: bool) -> TestMatrixParams {
    if quick {
        return image_quick_matrix(OPAQUE);
    }
    TestMatrixParams {
        width: Sweep::new(8, 16, 1),
        height: Sweep::new(2, 16, 2),
        stride: StrideSweep::UpToDouble { step: 2 },
        misalign: Sweep::new(0, 8, 1),
        source: Some(SourceParams {
            stride: StrideSweep::UpToDouble { step: 2 },
            misalign: Sweep::new(0, 3, 1),
        }),
        bg_opa: OPAQUE,
        fg_opa: OPAQUE,
    }
}

/// Opacity sweep over a narrower geometry.
fn image_opa_matrix(quick: bool) -> TestMatrixParams {
    if quick {
        return image_quick_matrix(OpacitySweep::full());
    }
    TestMatrixParams {
        width: Sweep::new(8, 16, 1),
        height: Sweep::new(2, 3, 1),
        stride: StrideSweep::Extra {
            max_extra: 4,
            step: 2,
        },
        misalign: Sweep::new(0, 3, 1),
        source: Some(SourceParams {
            stride: StrideSweep::Extra {
                max_extra: 2,
                step: 2,
            },
            misalign: Sweep::new(0, 1, 1),
        }),
        bg_opa: OPAQUE,
        fg_opa: OpacitySweep::full(),
    }
}

fn suite_case(
    name: &str,
    op: OpKind,
    dest: ColorFormat,
    src: Option<ColorFormat>,
    matrix: impl Fn(bool) -> TestMatrixParams,
) -> SuiteCase {
    SuiteCase {
        case: EquivalenceCase::new(name, op, dest, src),
        full: matrix(false),
        quick: matrix(true),
    }
}

/// Every equivalence case, including those that currently fail closed to the reference.
pub fn equivalence_cases() -> Vec<SuiteCase> {
    use ColorFormat::{Argb8888, Rgb565};
    vec![
        suite_case("fill_argb8888", OpKind::Fill, Argb8888, None, fill_matrix),
        suite_case("fill_rgb565", OpKind::Fill, Rgb565, None, fill_matrix),
        suite_case(
            "fill_opa_argb8888",
            OpKind::FillWithOpacity,
            Argb8888,
            None,
            fill_opa_matrix,
        ),
        suite_case(
            "fill_opa_rgb565",
            OpKind::FillWithOpacity,
            Rgb565,
            None,
            fill_opa_matrix,
        ),
        suite_case(
            "image_rgb565",
            OpKind::ImageComposite,
            Rgb565,
            Some(Rgb565),
            image_matrix,
        ),
        suite_case(
            "image_opa_rgb565",
            OpKind::ImageComposite,
            Rgb565,
            Some(Rgb565),
            image_opa_matrix,
        ),
        suite_case(
            "image_argb8888",
            OpKind::ImageComposite,
            Argb8888,
            Some(Argb8888),
            image_opa_matrix,
        ),
        suite_case(
            "image_argb8888_to_rgb565",
            OpKind::ImageComposite,
            Rgb565,
            Some(Argb8888),
            image_opa_matrix,
        ),
    ]
}

pub fn find_equivalence_case(name: &str) -> Option<SuiteCase> {
    equivalence_cases().into_iter().find(|c| c.name() == name)
}

fn bench_case(
    name: &str,
    op: OpKind,
    dest: ColorFormat,
    src: Option<ColorFormat>,
    opacity: u8,
    common_reinit: ReinitPolicy,
    corner_reinit: ReinitPolicy,
) -> BenchCase {
    BenchCase {
        name: name.to_owned(),
        op,
        dest_format: dest,
        src_format: src,
        color: FOREGROUND,
        opacity,
        common_reinit,
        corner_reinit,
        iterations: DEFAULT_ITERATIONS,
    }
}

/// Benchmark cases; each has a built-in threshold on the platforms that accelerate it.
pub fn benchmark_cases() -> Vec<BenchCase> {
    use ColorFormat::{Argb8888, Rgb565};
    let composite_dest = ReinitPolicy::Refill {
        pattern: Pattern::EvenBytes,
    };
    vec![
        bench_case(
            "fill_argb8888",
            OpKind::Fill,
            Argb8888,
            None,
            255,
            ReinitPolicy::Static,
            ReinitPolicy::Static,
        ),
        bench_case(
            "fill_rgb565",
            OpKind::Fill,
            Rgb565,
            None,
            255,
            ReinitPolicy::Static,
            ReinitPolicy::Static,
        ),
        // About 10 % opacity; the corner case varies alpha per pixel to defeat uniform fast paths.
        bench_case(
            "fill_opa_argb8888",
            OpKind::FillWithOpacity,
            Argb8888,
            None,
            25,
            ReinitPolicy::Refill {
                pattern: Pattern::Zero,
            },
            ReinitPolicy::Refill {
                pattern: Pattern::DynamicAlpha { color: BACKGROUND },
            },
        ),
        bench_case(
            "image_rgb565",
            OpKind::ImageComposite,
            Rgb565,
            Some(Rgb565),
            255,
            ReinitPolicy::Static,
            ReinitPolicy::Static,
        ),
        bench_case(
            "image_argb8888",
            OpKind::ImageComposite,
            Argb8888,
            Some(Argb8888),
            200,
            composite_dest,
            composite_dest,
        ),
    ]
}

pub fn find_benchmark_case(name: &str) -> Option<BenchCase> {
    benchmark_cases().into_iter().find(|c| c.name == name)
}

#[cfg(test)]
#[path = "../../tests/unit/suite/suite.rs"]
mod tests;
