use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use blendcheck::{
    BenchRunner, BlitImplementation as _, CycleCounter, Dispatcher, EquivalenceChecker,
    HarnessConfig, MonotonicCounter, ThresholdTable, count_combinations, suite,
};

#[derive(Parser, Debug)]
#[command(name = "blendcheck", version)]
struct Cli {
    /// Harness config JSON (guard size, failure cap, benchmark iterations).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List equivalence cases, benchmark cases and the accelerated routines of this platform.
    List,
    /// Run equivalence cases and report every mismatch or guard violation.
    Check(CheckArgs),
    /// Benchmark reference against accelerated and hold the speedup against thresholds.
    Bench(BenchArgs),
    /// Print the threshold table as JSON.
    Thresholds(ThresholdArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Case name; repeat to run several. Defaults to every case.
    #[arg(long = "case")]
    cases: Vec<String>,

    /// Use the reduced matrices.
    #[arg(long)]
    quick: bool,

    /// Print reports as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Write reference/accelerated PNGs of every reported failure into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BenchArgs {
    /// Case name; repeat to run several. Defaults to every case.
    #[arg(long = "case")]
    cases: Vec<String>,

    /// Timed invocations per measurement (overrides the config).
    #[arg(long)]
    iterations: Option<u32>,

    /// Measurements per benchmark; the median is reported (overrides the config).
    #[arg(long)]
    repeats: Option<u32>,

    /// Threshold table JSON; defaults to the built-in table.
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Tick source.
    #[arg(long, value_enum, default_value_t = CounterChoice::Native)]
    counter: CounterChoice,

    /// Report speedups without failing on thresholds.
    #[arg(long)]
    no_evaluate: bool,

    /// Print results as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ThresholdArgs {
    /// Validate and print this table instead of the built-in one.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CounterChoice {
    /// Cycle counter where available, monotonic clock elsewhere.
    Native,
    /// Monotonic clock in nanoseconds.
    Monotonic,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => HarnessConfig::from_path(path)?,
        None => HarnessConfig::default(),
    };

    match cli.cmd {
        Command::List => cmd_list(),
        Command::Check(args) => cmd_check(args, &config),
        Command::Bench(args) => cmd_bench(args, &config),
        Command::Thresholds(args) => cmd_thresholds(args),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_list() -> anyhow::Result<()> {
    let dispatcher = Dispatcher::native();
    println!("platform: {}", dispatcher.platform());

    println!("accelerated routines:");
    for key in dispatcher.registry().keys() {
        let name = dispatcher
            .registry()
            .lookup(key)
            .map(|r| r.name())
            .unwrap_or("?");
        println!("  {key:<40} {name}");
    }

    println!("equivalence cases:");
    for case in suite::equivalence_cases() {
        let c = &case.case;
        let path = if dispatcher.has_accelerated(c.op, c.dest_format, c.src_format) {
            "accelerated"
        } else {
            "reference only"
        };
        println!(
            "  {:<28} full={:<8} quick={:<6} {path}",
            case.name(),
            count_combinations(&case.full)?,
            count_combinations(&case.quick)?,
        );
    }

    println!("benchmark cases:");
    for case in suite::benchmark_cases() {
        println!(
            "  {:<28} {} {} opacity={}",
            case.name, case.op, case.dest_format, case.opacity
        );
    }
    Ok(())
}

fn select<T>(
    all: Vec<T>,
    wanted: &[String],
    name: impl Fn(&T) -> &str,
) -> anyhow::Result<Vec<T>> {
    if wanted.is_empty() {
        return Ok(all);
    }
    let mut out = Vec::with_capacity(wanted.len());
    let mut pool: Vec<Option<T>> = all.into_iter().map(Some).collect();
    for w in wanted {
        let slot = pool
            .iter_mut()
            .find(|t| t.as_ref().is_some_and(|t| name(t) == w))
            .with_context(|| format!("unknown or repeated case '{w}'"))?;
        out.extend(slot.take());
    }
    Ok(out)
}

fn cmd_check(args: CheckArgs, config: &HarnessConfig) -> anyhow::Result<()> {
    let cases = select(suite::equivalence_cases(), &args.cases, |c| c.name())?;
    let checker = EquivalenceChecker::from_config(Dispatcher::native(), config);

    let mut reports = Vec::with_capacity(cases.len());
    for case in &cases {
        let report = checker.run(&case.case, case.params(args.quick))?;
        if let Some(dir) = &args.dump_dir {
            for (i, failure) in report.failures.iter().enumerate() {
                let Some(combo) = &failure.params else {
                    continue;
                };
                dump_capture(&checker, case, combo, dir, i)?;
            }
        }
        if !args.json {
            println!("{report}");
        }
        reports.push(report);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("serialize reports")?
        );
    }

    let failed: u64 = reports.iter().map(|r| r.failure_count).sum();
    if failed > 0 {
        anyhow::bail!("{failed} failing combinations");
    }
    Ok(())
}

fn dump_capture(
    checker: &EquivalenceChecker,
    case: &suite::SuiteCase,
    combo: &blendcheck::Combination,
    dir: &Path,
    index: usize,
) -> anyhow::Result<()> {
    let capture = checker.capture(&case.case, combo)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create dump dir '{}'", dir.display()))?;

    for (label, data) in [
        ("reference", &capture.reference),
        ("accelerated", &capture.accelerated),
    ] {
        let rgba = blendcheck::to_rgba8(
            capture.format,
            data,
            combo.width,
            combo.height,
            capture.stride,
        )?;
        let path = dir.join(format!("{}_{index:03}_{label}.png", case.name()));
        image::save_buffer_with_format(
            &path,
            &rgba,
            combo.width,
            combo.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        tracing::info!(path = %path.display(), %combo, "dumped capture");
    }
    Ok(())
}

fn cmd_bench(args: BenchArgs, config: &HarnessConfig) -> anyhow::Result<()> {
    let mut cases = select(suite::benchmark_cases(), &args.cases, |c| c.name.as_str())?;
    let iterations = args.iterations.unwrap_or(config.bench_iterations);
    if iterations == 0 {
        anyhow::bail!("--iterations must be > 0");
    }
    for case in &mut cases {
        case.iterations = iterations;
    }

    let table = match &args.thresholds {
        Some(path) => ThresholdTable::from_path(path)?,
        None => ThresholdTable::builtin(),
    };

    let counter: Box<dyn CycleCounter> = match args.counter {
        CounterChoice::Native => blendcheck::default_counter(),
        CounterChoice::Monotonic => Box::new(MonotonicCounter::new()),
    };
    let dispatcher = Dispatcher::native();
    let runner = BenchRunner::new(&dispatcher, counter.as_ref())
        .with_repeats(args.repeats.unwrap_or(config.bench_repeats))
        .with_guard_pixels(config.guard_pixels);

    let mut results = Vec::with_capacity(cases.len());
    let mut failures = Vec::new();
    for (case, result) in runner.run_each(&cases) {
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                let msg = err.to_string();
                if !args.json {
                    println!("{:<20} failed: {msg}", case.name);
                }
                results.push(serde_json::json!({ "case": case.name, "error": msg }));
                failures.push(err);
                continue;
            }
        };
        let accelerated = dispatcher.has_accelerated(case.op, case.dest_format, case.src_format);

        let verdict = if args.no_evaluate || !accelerated {
            "not evaluated".to_owned()
        } else {
            match result.evaluate(&table) {
                Ok(_) => "ok".to_owned(),
                Err(err) => {
                    let msg = err.to_string();
                    failures.push(err);
                    msg
                }
            }
        };

        if !args.json {
            println!(
                "{:<20} common {:>8.2} vs {:>8.2} {}/px (x{:.2})  corner {:>8.2} vs {:>8.2} (x{:.2})  {verdict}",
                result.case,
                result.common.reference.cycles_per_pixel,
                result.common.accelerated.cycles_per_pixel,
                result.unit,
                result.common.speedup(),
                result.corner.reference.cycles_per_pixel,
                result.corner.accelerated.cycles_per_pixel,
                result.corner.speedup(),
            );
        }
        let mut entry = serde_json::to_value(&result).context("serialize bench result")?;
        entry["verdict"] = verdict.into();
        results.push(entry);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("serialize bench results")?
        );
    }

    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.swap_remove(0).into()),
        n => {
            let first = failures.swap_remove(0);
            Err(anyhow::Error::from(first).context(format!("{n} benchmark cases failed")))
        }
    }
}

fn cmd_thresholds(args: ThresholdArgs) -> anyhow::Result<()> {
    let table = match &args.in_path {
        Some(path) => ThresholdTable::from_path(path)?,
        None => ThresholdTable::builtin(),
    };
    println!("{}", table.to_json_pretty()?);
    Ok(())
}
