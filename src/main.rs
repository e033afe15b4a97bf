use clap::{Parser, Subcommand};
use framescore::config::{self, EngineConfig};
use framescore::live::{self, LiveMonitor};
use framescore::record::{EvaluationRecord, EvaluationType};
use framescore::{batch, evaluate, output};
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// Shared flags for commands that evaluate photos from disk.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the evaluation cache and re-evaluate every photo
    #[arg(long)]
    no_cache: bool,

    /// Directory holding the evaluation cache
    #[arg(long, default_value = ".framescore-cache")]
    cache_dir: PathBuf,
}

#[derive(Parser)]
#[command(name = "framescore")]
#[command(about = "Score photos against composition heuristics")]
#[command(long_about = "\
Score photos against composition heuristics

Each photo is drawn onto a small working surface (300x400 by default) and
reduced to a handful of pixel statistics: brightness, contrast, saturation,
Sobel edges, rule-of-thirds interest, center focus and subject size. Those
feed five dimension scores and a total out of 100:

  Composition  0-30   thirds interest, center focus, detail
  Angle        0-20   contrast, edge strength
  Distance     0-10   how much of the frame the subject fills
  Lighting     0-10   exposure, saturation, clipped shadows/highlights
  Pose         fixed  baseline only; pose is never measured

Every dimension below its top band comes with a suggestion.

Configuration is read from --config, or ./framescore.toml when present.
Run 'framescore gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Engine config file (defaults to ./framescore.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate photos and directories of photos
    Evaluate {
        /// Photos or directories (walked recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print evaluation records as JSON instead of the score breakdown
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Re-evaluate one photo on a timer and print live hints
    Watch {
        /// Photo to watch (e.g. a preview frame the camera keeps overwriting)
        path: PathBuf,

        /// Milliseconds between evaluations
        #[arg(long, default_value_t = live::DEFAULT_INTERVAL_MS)]
        interval_ms: u64,

        /// Stop after this many ticks (default: run until interrupted)
        #[arg(long)]
        frames: Option<usize>,
    },
    /// Print a stock framescore.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Evaluate { paths, json, cache } => {
            let engine_config = resolve_engine_config(cli.config.as_deref())?;
            init_thread_pool(&engine_config.processing);

            let photos = batch::discover_photos(&paths)?;
            if photos.is_empty() {
                return Err("no photos found".into());
            }
            let cache_dir = (!cache.no_cache).then_some(cache.cache_dir.as_path());

            let result = if json {
                let result = batch::evaluate_batch(&photos, &engine_config, cache_dir, None);
                print_records(&result)?;
                result
            } else {
                let (tx, rx) = mpsc::channel();
                let printer = thread::spawn(move || {
                    for event in rx {
                        output::print_batch_event(&event);
                    }
                });
                let result = batch::evaluate_batch(&photos, &engine_config, cache_dir, Some(tx));
                printer.join().map_err(|_| "output thread panicked")?;
                output::print_batch_summary(&result, cache_dir.is_some());
                result
            };

            let failed = result.failures();
            if failed > 0 {
                return Err(format!("{} of {} photos failed", failed, photos.len()).into());
            }
        }
        Command::Watch {
            path,
            interval_ms,
            frames,
        } => {
            let engine_config = resolve_engine_config(cli.config.as_deref())?;
            watch(path, engine_config, Duration::from_millis(interval_ms), frames)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize env_logger: `warn` by default, raised by each `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Load `--config`, or `./framescore.toml` when present, over stock defaults.
fn resolve_engine_config(explicit: Option<&Path>) -> Result<EngineConfig, config::ConfigError> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| config::discover_config(&dir)),
    };
    if let Some(p) = &path {
        log::info!("using config {}", p.display());
    }
    config::load_config(path.as_deref())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only constrain down.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Print one JSON object per photo: the evaluation record, or the error.
fn print_records(result: &batch::BatchResult) -> Result<(), serde_json::Error> {
    let items: Vec<serde_json::Value> = result
        .evaluations
        .iter()
        .map(|e| match &e.outcome {
            Ok(r) => serde_json::json!({
                "path": e.path,
                "record": EvaluationRecord::from_result(r, EvaluationType::Upload, None),
            }),
            Err(err) => serde_json::json!({
                "path": e.path,
                "error": err.to_string(),
            }),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

/// Live mode: one evaluation per tick on a worker thread, at most one in
/// flight. Ticks that land while a frame is still being scored print `busy`.
fn watch(
    path: PathBuf,
    engine_config: EngineConfig,
    interval: Duration,
    frames: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = Arc::new(LiveMonitor::new(engine_config.feedback.locale));
    let engine_config = Arc::new(engine_config);
    println!("{}", monitor.initial_hint());

    let (tx, rx) = mpsc::channel();
    let printer = thread::spawn(move || {
        for (tick, feedback) in rx {
            output::print_live_feedback(tick, &feedback);
        }
    });

    let mut workers = Vec::new();
    let mut tick = 0usize;
    while frames.is_none_or(|n| tick < n) {
        tick += 1;
        let monitor = Arc::clone(&monitor);
        let engine_config = Arc::clone(&engine_config);
        let path = path.clone();
        let tx = tx.clone();
        workers.push(thread::spawn(move || {
            let feedback = monitor.poll(|| evaluate::evaluate(path, &engine_config));
            tx.send((tick, feedback)).ok();
        }));
        workers.retain(|w| !w.is_finished());
        thread::sleep(interval);
    }

    drop(tx);
    for worker in workers {
        worker.join().map_err(|_| "live worker panicked")?;
    }
    printer.join().map_err(|_| "output thread panicked")?;
    Ok(())
}
