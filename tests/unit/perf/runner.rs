use std::cell::{Cell, RefCell};

use super::*;
use crate::accel::AccelRoutine;
use crate::blend::BlitJob;
use crate::dispatch::{Platform, Registry, RoutineKey};

/// Advances by a fixed step on every read, so each timed invocation costs exactly `step` ticks.
struct ScriptedCounter {
    now: Cell<u64>,
    step: u64,
}

impl ScriptedCounter {
    fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }
}

impl CycleCounter for ScriptedCounter {
    fn read(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(self.step));
        t
    }

    fn unit(&self) -> &'static str {
        "ticks"
    }
}

fn fill_case() -> BenchCase {
    BenchCase {
        name: "fill".to_owned(),
        op: OpKind::Fill,
        dest_format: ColorFormat::Argb8888,
        src_format: None,
        color: Color::new(0x12, 0x34, 0x56),
        opacity: 255,
        common_reinit: ReinitPolicy::Static,
        corner_reinit: ReinitPolicy::Static,
        iterations: 4,
    }
}

fn measurement(implementation: Implementation, cycles_per_iteration: f64) -> Measurement {
    Measurement {
        implementation,
        iterations: 1,
        repeats: 1,
        total_cycles: cycles_per_iteration as u64,
        cycles_per_iteration,
        cycles_per_pixel: 0.0,
        output: Vec::new(),
    }
}

fn comparison(scenario: BenchScenario, reference: f64, accelerated: f64) -> Comparison {
    Comparison {
        scenario,
        geometry: BenchGeometry::for_scenario(scenario),
        reference: measurement(Implementation::Reference, reference),
        accelerated: measurement(Implementation::Accelerated, accelerated),
    }
}

const FILL_X86: ThresholdKey = ThresholdKey {
    op: OpKind::Fill,
    format: ColorFormat::Argb8888,
    platform: crate::dispatch::Platform::X86_64,
};

#[test]
fn geometries() {
    assert_eq!(BenchGeometry::COMMON.pixels(), 128 * 128);
    assert_eq!(BenchGeometry::CORNER.pixels(), 127 * 127);
    assert_eq!(BenchGeometry::CORNER.misalign, 1);
}

#[test]
fn scripted_counter_gives_exact_cycles() {
    let counter = ScriptedCounter::new(10);
    let dispatcher = Dispatcher::reference_only();
    let runner = BenchRunner::new(&dispatcher, &counter).with_repeats(3);
    let m = runner
        .measure(&fill_case(), BenchScenario::Common, Implementation::Reference, 4)
        .unwrap();
    assert_eq!(m.implementation, Implementation::Reference);
    assert_eq!(m.total_cycles, 10 * 4 * 3);
    assert_eq!(m.cycles_per_iteration, 10.0);
    assert_eq!(m.cycles_per_pixel, 10.0 / (128.0 * 128.0));
    assert_eq!(m.output.len(), 128 * 128 * 4);
    assert_eq!(m.output[..4], fill_case().color.to_argb8888());
}

#[test]
fn zero_iterations_is_a_setup_error() {
    let counter = ScriptedCounter::new(1);
    let dispatcher = Dispatcher::reference_only();
    let runner = BenchRunner::new(&dispatcher, &counter);
    assert!(
        runner
            .measure(&fill_case(), BenchScenario::Corner, Implementation::Reference, 0)
            .is_err()
    );
}

#[test]
fn both_sides_produce_the_same_output() {
    let counter = ScriptedCounter::new(1);
    let dispatcher = Dispatcher::native();
    let runner = BenchRunner::new(&dispatcher, &counter);
    let mut case = fill_case();
    case.op = OpKind::ImageComposite;
    case.src_format = Some(ColorFormat::Argb8888);
    case.opacity = 200;
    case.common_reinit = ReinitPolicy::Refill {
        pattern: Pattern::EvenBytes,
    };
    case.corner_reinit = case.common_reinit;
    let cmp = runner.compare(&case, BenchScenario::Corner).unwrap();
    assert_eq!(cmp.reference.output, cmp.accelerated.output);
    assert_eq!(cmp.speedup(), 1.0);
}

#[test]
fn run_keys_the_result_by_platform() {
    let counter = ScriptedCounter::new(2);
    let dispatcher = Dispatcher::reference_only();
    let runner = BenchRunner::new(&dispatcher, &counter);
    let result = runner.run(&fill_case()).unwrap();
    assert_eq!(result.key.platform, dispatcher.platform());
    assert_eq!(result.unit, "ticks");
    assert_eq!(result.common.scenario, BenchScenario::Common);
    assert_eq!(result.corner.scenario, BenchScenario::Corner);
}

const BACKGROUND: Color = Color::new(0xAB, 0xCD, 0xEF);

/// Corner-scenario fill-with-opacity that blends over the previous result unless refilled.
fn fill_opa_case(pattern: Pattern) -> BenchCase {
    BenchCase {
        name: "fill_opa".to_owned(),
        op: OpKind::FillWithOpacity,
        opacity: 25,
        corner_reinit: ReinitPolicy::Refill { pattern },
        ..fill_case()
    }
}

fn dispatcher_with(op: OpKind, run: fn(&mut BlitJob<'_>) -> HarnessResult<()>) -> Dispatcher {
    let platform = Platform::Portable;
    let mut registry = Registry::empty();
    registry
        .register(
            RoutineKey {
                op,
                dest_format: ColorFormat::Argb8888,
                src_format: None,
                platform,
            },
            AccelRoutine { name: "scripted", run },
        )
        .unwrap();
    Dispatcher::new(registry, platform)
}

#[test]
fn refill_makes_output_independent_of_iterations() {
    let counter = ScriptedCounter::new(1);
    let dispatcher = Dispatcher::reference_only();
    let runner = BenchRunner::new(&dispatcher, &counter).with_repeats(2);
    let case = fill_opa_case(Pattern::DynamicAlpha { color: BACKGROUND });

    let once = runner
        .measure(&case, BenchScenario::Corner, Implementation::Reference, 1)
        .unwrap();
    let many = runner
        .measure(&case, BenchScenario::Corner, Implementation::Reference, 7)
        .unwrap();
    assert_eq!(once.output, many.output);

    let mut painted = vec![0u8; once.output.len()];
    Pattern::DynamicAlpha { color: BACKGROUND }.paint(ColorFormat::Argb8888, &mut painted);
    assert_ne!(once.output, painted);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    Read,
    Blit { fresh: bool },
}

thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

/// Logs every read into the thread's event list.
struct LoggingCounter;

impl CycleCounter for LoggingCounter {
    fn read(&self) -> u64 {
        EVENTS.with(|e| e.borrow_mut().push(Event::Read));
        EVENTS.with(|e| e.borrow().len() as u64)
    }

    fn unit(&self) -> &'static str {
        "events"
    }
}

/// Records whether the destination still holds the repaint pattern, then blends.
fn blit_over_background(job: &mut BlitJob<'_>) -> HarnessResult<()> {
    let expected = [BACKGROUND.b, BACKGROUND.g, BACKGROUND.r, 0x80];
    let mut fresh = true;
    for y in 0..job.height {
        fresh &= job.row(y).dest.chunks_exact(4).all(|p| p == expected);
    }
    EVENTS.with(|e| e.borrow_mut().push(Event::Blit { fresh }));
    crate::blend::reference::blit(job);
    Ok(())
}

#[test]
fn repaint_happens_before_the_timed_bracket_opens() {
    EVENTS.with(|e| e.borrow_mut().clear());
    let dispatcher = dispatcher_with(OpKind::FillWithOpacity, blit_over_background);
    let counter = LoggingCounter;
    let runner = BenchRunner::new(&dispatcher, &counter).with_repeats(2);
    let case = fill_opa_case(Pattern::Background {
        color: BACKGROUND,
        alpha: 0x80,
    });

    let m = runner
        .measure(&case, BenchScenario::Corner, Implementation::Accelerated, 3)
        .unwrap();
    assert_eq!(m.implementation, Implementation::Accelerated);

    let events = EVENTS.with(|e| e.take());
    let mut expected = vec![Event::Blit { fresh: true }];
    for _ in 0..2 * 3 {
        expected.extend([Event::Read, Event::Blit { fresh: true }, Event::Read]);
    }
    assert_eq!(events, expected);
}

fn failing(_: &mut BlitJob<'_>) -> HarnessResult<()> {
    Err(HarnessError::validation("routine gave up"))
}

#[test]
fn failing_case_does_not_stop_later_cases() {
    let counter = ScriptedCounter::new(1);
    let dispatcher = dispatcher_with(OpKind::Fill, failing);
    let runner = BenchRunner::new(&dispatcher, &counter);
    let mut rgb565 = fill_case();
    rgb565.name = "fill_rgb565".to_owned();
    rgb565.dest_format = ColorFormat::Rgb565;
    let cases = [fill_case(), rgb565, fill_opa_case(Pattern::Zero)];

    let outcomes: Vec<_> = runner
        .run_each(&cases)
        .map(|(case, result)| (case.name.clone(), result.is_ok()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("fill".to_owned(), false),
            ("fill_rgb565".to_owned(), true),
            ("fill_opa".to_owned(), true),
        ]
    );
}

#[test]
fn speedup_handles_zero_cost() {
    assert_eq!(speedup(10.0, 5.0), 2.0);
    assert!(speedup(10.0, 0.0).is_infinite());
}

#[test]
fn evaluate_passes_at_threshold() {
    let table = ThresholdTable::builtin();
    let verdict = evaluate(
        &comparison(BenchScenario::Common, 150.0, 100.0),
        &comparison(BenchScenario::Corner, 120.0, 100.0),
        &table,
        &FILL_X86,
    )
    .unwrap();
    assert_eq!(verdict.common_speedup, 1.5);
    assert_eq!(verdict.corner_required, 1.2);
}

#[test]
fn evaluate_reports_the_failing_scenario() {
    let table = ThresholdTable::builtin();
    let err = evaluate(
        &comparison(BenchScenario::Common, 200.0, 100.0),
        &comparison(BenchScenario::Corner, 110.0, 100.0),
        &table,
        &FILL_X86,
    )
    .unwrap_err();
    match err {
        HarnessError::RegressionBelowThreshold {
            scenario,
            measured,
            required,
            ..
        } => {
            assert_eq!(scenario, BenchScenario::Corner);
            assert!((measured - 1.1).abs() < 1e-9);
            assert_eq!(required, 1.2);
        }
        other => panic!("expected a regression, got {other:?}"),
    }
}

#[test]
fn evaluate_without_entry_fails() {
    let key = ThresholdKey {
        platform: crate::dispatch::Platform::Portable,
        ..FILL_X86
    };
    let err = evaluate(
        &comparison(BenchScenario::Common, 900.0, 1.0),
        &comparison(BenchScenario::Corner, 900.0, 1.0),
        &ThresholdTable::builtin(),
        &key,
    )
    .unwrap_err();
    assert!(matches!(err, HarnessError::MissingThresholdEntry { .. }));
}

#[test]
fn median_of_even_and_odd() {
    assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
    assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_eq!(median(&mut []), 0.0);
}
