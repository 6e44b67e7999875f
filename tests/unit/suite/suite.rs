use super::*;
use crate::matrix::count_combinations;
use crate::perf::ThresholdTable;
use crate::dispatch::Platform;

#[test]
fn case_names_are_unique() {
    let cases = equivalence_cases();
    let mut names: Vec<&str> = cases.iter().map(SuiteCase::name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), cases.len());

    let benches = benchmark_cases();
    let mut names: Vec<&str> = benches.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), benches.len());
}

#[test]
fn every_matrix_is_valid_and_bounded() {
    for case in equivalence_cases() {
        let full = count_combinations(&case.full).unwrap();
        let quick = count_combinations(&case.quick).unwrap();
        assert!(quick > 0, "{}", case.name());
        assert!(quick < full, "{}", case.name());
        assert!(quick <= 20_000, "{} quick={quick}", case.name());
        assert!(full <= 200_000, "{} full={full}", case.name());
    }
}

#[test]
fn composites_carry_source_params() {
    for case in equivalence_cases() {
        let composite = case.case.op == OpKind::ImageComposite;
        assert_eq!(case.case.src_format.is_some(), composite, "{}", case.name());
        assert_eq!(case.full.source.is_some(), composite, "{}", case.name());
        assert_eq!(case.quick.source.is_some(), composite, "{}", case.name());
    }
}

#[test]
fn opacity_cases_sweep_opacity() {
    let case = find_equivalence_case("fill_opa_argb8888").unwrap();
    assert_eq!(case.full.fg_opa, OpacitySweep::full());
    assert_eq!(case.full.bg_opa, OpacitySweep::full());
    assert!(find_equivalence_case("nope").is_none());
}

#[test]
fn x86_bench_cases_have_thresholds() {
    let table = ThresholdTable::builtin();
    for case in benchmark_cases() {
        let key = crate::perf::ThresholdKey {
            op: case.op,
            format: case.dest_format,
            platform: Platform::X86_64,
        };
        assert!(table.lookup(&key).is_ok(), "{}", case.name);
        assert!(case.iterations > 0);
    }
}

#[test]
fn fill_opa_corner_defeats_uniform_alpha() {
    let case = find_benchmark_case("fill_opa_argb8888").unwrap();
    assert_eq!(case.opacity, 25);
    assert_eq!(
        case.reinit(crate::perf::BenchScenario::Corner),
        ReinitPolicy::Refill {
            pattern: Pattern::DynamicAlpha { color: BACKGROUND }
        }
    );
}
