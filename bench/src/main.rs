use std::path::PathBuf;

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

use blendcheck::{
    BenchCase, BenchResult, BenchRunner, BenchScenario, Comparison, CycleCounter, Dispatcher,
    MonotonicCounter, ThresholdTable,
};

#[derive(Clone, Debug)]
struct BenchArgs {
    cases: Vec<String>,
    iterations: u32,
    warmup: u32,
    repeats: u32,
    counter: Counter,
    thresholds: Option<PathBuf>,
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug)]
enum Counter {
    Native,
    Monotonic,
}

/// One scenario of one case, collected across repeats.
#[derive(Clone, Debug, Default)]
struct ScenarioSamples {
    reference_cpp: Vec<f64>,
    accelerated_cpp: Vec<f64>,
    speedup: Vec<f64>,
    reference_sha256: String,
    accelerated_sha256: String,
}

impl ScenarioSamples {
    fn push(&mut self, cmp: &Comparison) {
        self.reference_cpp.push(cmp.reference.cycles_per_pixel);
        self.accelerated_cpp.push(cmp.accelerated.cycles_per_pixel);
        self.speedup.push(cmp.speedup());
        self.reference_sha256 = sha256_hex(&cmp.reference.output);
        self.accelerated_sha256 = sha256_hex(&cmp.accelerated.output);
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.iterations == 0 || args.repeats == 0 {
        anyhow::bail!("--iterations and --repeats must be > 0");
    }

    let mut cases = blendcheck::suite::benchmark_cases();
    if !args.cases.is_empty() {
        for wanted in &args.cases {
            if !cases.iter().any(|c| &c.name == wanted) {
                anyhow::bail!("unknown case '{wanted}' (try --help)");
            }
        }
        cases.retain(|c| args.cases.contains(&c.name));
    }
    for case in &mut cases {
        case.iterations = args.iterations;
    }

    let table = match &args.thresholds {
        Some(path) => ThresholdTable::from_path(path)?,
        None => ThresholdTable::builtin(),
    };
    let counter: Box<dyn CycleCounter> = match args.counter {
        Counter::Native => blendcheck::default_counter(),
        Counter::Monotonic => Box::new(MonotonicCounter::new()),
    };
    let dispatcher = Dispatcher::native();
    let runner = BenchRunner::new(&dispatcher, counter.as_ref());

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {iterations} iterations/run, warmup={warmup}, platform={platform}, unit={unit}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        iterations = args.iterations,
        warmup = args.warmup,
        platform = dispatcher.platform(),
        unit = counter.unit(),
    );

    let mut report = Vec::with_capacity(cases.len());
    let mut failed = Vec::new();
    for case in &cases {
        let accelerated = dispatcher.has_accelerated(case.op, case.dest_format, case.src_format);
        let (common, corner, last) = match sample_case(&runner, case, &args) {
            Ok(samples) => samples,
            Err(err) => {
                eprintln!("\n{} (failed: {err:#})", case.name);
                report.push(json!({
                    "case": case.name,
                    "accelerated": accelerated,
                    "verdict": format!("error: {err:#}"),
                }));
                failed.push(case.name.as_str());
                continue;
            }
        };

        let verdict = if accelerated {
            match last.evaluate(&table) {
                Ok(_) => "ok".to_string(),
                Err(err) => err.to_string(),
            }
        } else {
            "reference only".to_string()
        };

        eprintln!("\n{} ({verdict}):", case.name);
        let mut scenarios = serde_json::Map::new();
        for (scenario, samples) in [(BenchScenario::Common, &common), (BenchScenario::Corner, &corner)]
        {
            report_percentiles(scenario, samples, counter.unit());
            scenarios.insert(scenario.to_string(), scenario_json(samples));
        }

        report.push(json!({
            "case": case.name,
            "key": last.key,
            "accelerated": accelerated,
            "iterations": args.iterations,
            "repeats": args.repeats,
            "unit": counter.unit(),
            "verdict": verdict,
            "scenarios": scenarios,
        }));
    }

    if let Some(out) = &args.out {
        let text = serde_json::to_string_pretty(&report).context("serialize bench report")?;
        std::fs::write(out, text).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("\nwrote {}", out.display());
    }
    if !failed.is_empty() {
        anyhow::bail!("{} case(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

/// Warm up, then collect `repeats` runs of both scenarios.
fn sample_case(
    runner: &BenchRunner<'_>,
    case: &BenchCase,
    args: &BenchArgs,
) -> anyhow::Result<(ScenarioSamples, ScenarioSamples, BenchResult)> {
    for _ in 0..args.warmup {
        runner
            .run(case)
            .with_context(|| format!("warm up '{}'", case.name))?;
    }

    let mut common = ScenarioSamples::default();
    let mut corner = ScenarioSamples::default();
    let mut last: Option<BenchResult> = None;
    for _ in 0..args.repeats {
        let result = runner.run(case)?;
        common.push(&result.common);
        corner.push(&result.corner);
        last = Some(result);
    }
    let last = last.context("no benchmark runs (bug)")?;
    Ok((common, corner, last))
}

fn case_names(cases: &[BenchCase]) -> String {
    cases
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        cases: Vec::new(),
        iterations: blendcheck::DEFAULT_ITERATIONS,
        warmup: 1,
        repeats: 25,
        counter: Counter::Native,
        thresholds: None,
        out: None,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--case" => out.cases.push(
                args.next()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --case"))?,
            ),
            "--iterations" => out.iterations = parse_u32(args.next(), "--iterations")?,
            "--warmup" => out.warmup = parse_u32(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_u32(args.next(), "--repeats")?,
            "--counter" => {
                let v = args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --counter (native|monotonic)")
                })?;
                out.counter = match v.as_str() {
                    "native" => Counter::Native,
                    "monotonic" => Counter::Monotonic,
                    _ => anyhow::bail!("unknown --counter '{v}' (expected native|monotonic)"),
                };
            }
            "--thresholds" => {
                out.thresholds = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --thresholds (expected a path)")
                })?))
            }
            "--out" => {
                out.out = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --out (expected a path)")
                })?))
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"blendcheck-bench

Runs every benchmark case repeatedly and reports p50/p90/p99 of cycles per pixel and speedup.

Usage:
  cargo run -q --release
  cargo run -q --release -- --case fill_argb8888 --repeats 100
  cargo run -q --release -- --counter monotonic --out bench.json

Args:
  --case NAME        run only this case (repeatable; default all)
  --iterations N     timed invocations per measurement (default 750)
  --warmup N         untimed runs per case before measuring (default 1)
  --repeats N        measured runs per case (default 25)
  --counter KIND     native|monotonic (default native)
  --thresholds PATH  threshold table JSON (default built-in)
  --out PATH         write a JSON report

Cases: {}
"#,
        case_names(&blendcheck::suite::benchmark_cases())
    );
}

fn parse_u32(v: Option<String>, flag: &str) -> anyhow::Result<u32> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<u32>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn sorted(v: &[f64]) -> Vec<f64> {
    let mut v = v.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

fn p(v: &[f64], p: f64) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let n = v.len();
    let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
    v[rank - 1]
}

fn percentiles(v: &[f64]) -> [f64; 3] {
    let v = sorted(v);
    [p(&v, 0.50), p(&v, 0.90), p(&v, 0.99)]
}

fn scenario_json(samples: &ScenarioSamples) -> serde_json::Value {
    let pct = |v: &[f64]| {
        let [p50, p90, p99] = percentiles(v);
        json!({ "p50": p50, "p90": p90, "p99": p99 })
    };
    json!({
        "reference_cycles_per_pixel": pct(&samples.reference_cpp),
        "accelerated_cycles_per_pixel": pct(&samples.accelerated_cpp),
        "speedup": pct(&samples.speedup),
        "reference_sha256": samples.reference_sha256,
        "accelerated_sha256": samples.accelerated_sha256,
    })
}

fn report_percentiles(scenario: BenchScenario, samples: &ScenarioSamples, unit: &str) {
    type Field<'a> = (&'static str, &'a [f64]);
    let fields: [Field<'_>; 3] = [
        ("reference", &samples.reference_cpp),
        ("accelerated", &samples.accelerated_cpp),
        ("speedup", &samples.speedup),
    ];

    eprintln!("  {scenario} (p50/p90/p99, {unit}/px):");
    for (name, values) in fields {
        let [p50, p90, p99] = percentiles(values);
        eprintln!("    {name:12} p50={p50:>9.3}  p90={p90:>9.3}  p99={p99:>9.3}");
    }
    let same = samples.reference_sha256 == samples.accelerated_sha256;
    eprintln!(
        "    output sha256 {} ({})",
        samples.accelerated_sha256,
        if same { "matches reference" } else { "DIFFERS from reference" }
    );
}
