use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use fern::Dispatch;
use filmgrain::{
    BatchScheduler, DEFAULT_DURATION_MULTIPLIER, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WORKERS,
    FrameSequence, GrainError, GrainOptions, ProgressCallback, ProgressInfo, indexer,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  filmgrain apply --source frames --grain plates --out grained --opacity 0.3 --progress\n  filmgrain apply --source poster.png --grain plates --out grained --opacity 0.4 --duration-multiplier 48\n  filmgrain plan --source-count 3 --grain-count 2 --duration-multiplier 2\n  filmgrain completions zsh > _filmgrain";

#[derive(Debug, Parser)]
#[command(
    name = "filmgrain",
    version,
    about = "Overlay film-grain plates onto still frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while compositing.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow writing into an output folder that already contains files.
    #[arg(long, global = true)]
    overwrite: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Composite grain over every source frame.
    #[command(
        about = "Apply grain to frames",
        after_help = "Examples:\n  filmgrain apply --source frames --grain plates --out grained --opacity 0.3\n  filmgrain apply --source frames --grain plates --out grained --opacity 0.3 --threads 8 --json"
    )]
    Apply {
        /// Source image, or directory of source frames.
        #[arg(long)]
        source: PathBuf,
        /// Directory of grain plates.
        #[arg(long)]
        grain: PathBuf,
        /// Output directory (created if missing).
        #[arg(long)]
        out: PathBuf,
        /// Grain opacity between 0.0 and 1.0.
        #[arg(long)]
        opacity: f64,
        /// Repeat the source sequence this many times.
        #[arg(long, default_value_t = DEFAULT_DURATION_MULTIPLIER)]
        duration_multiplier: u32,
        /// Maximum number of frames composited at once.
        #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
        threads: usize,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        quality: u8,
        /// Print a machine-readable JSON summary.
        #[arg(long)]
        json: bool,
    },

    /// Print which source and grain frame each output iteration uses.
    #[command(
        about = "Show the frame pairing plan",
        after_help = "Examples:\n  filmgrain plan --source-count 3 --grain-count 2 --duration-multiplier 2"
    )]
    Plan {
        /// Number of source frames.
        #[arg(long)]
        source_count: usize,
        /// Number of grain frames.
        #[arg(long)]
        grain_count: usize,
        /// Repeat the source sequence this many times.
        #[arg(long, default_value_t = DEFAULT_DURATION_MULTIPLIER)]
        duration_multiplier: u32,
        /// Output the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(total);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        if info.failed > 0 {
            self.bar.set_message(format!("{} failed", info.failed));
        }
    }
}

fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn load_source(path: &Path) -> Result<FrameSequence, Box<dyn std::error::Error>> {
    if path.is_dir() {
        Ok(FrameSequence::from_directory(path)?)
    } else if path.is_file() {
        Ok(FrameSequence::single(path))
    } else {
        Err(format!("source not found: {}", path.display()).into())
    }
}

fn prepare_output_folder(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        return Ok(());
    }
    if !path.is_dir() {
        return Err(format!("output is not a directory: {}", path.display()).into());
    }

    let occupied = fs::read_dir(path)?.next().is_some();
    if occupied {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("writing into non-empty {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output folder is not empty: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn plan_rows(
    source_count: usize,
    grain_count: usize,
    duration_multiplier: u32,
) -> Result<Vec<(i64, usize, usize)>, Box<dyn std::error::Error>> {
    if source_count == 0 {
        return Err(GrainError::EmptySequence { sequence: "source" }.into());
    }
    if grain_count == 0 {
        return Err(GrainError::EmptySequence { sequence: "grain" }.into());
    }
    if duration_multiplier == 0 {
        return Err(GrainError::InvalidDurationMultiplier.into());
    }

    let total = indexer::total_iterations(source_count, duration_multiplier)?;
    (0..total)
        .map(|iteration| -> Result<_, Box<dyn std::error::Error>> {
            let pair = indexer::resolve(iteration, source_count, grain_count)?;
            Ok((iteration, pair.source, pair.grain))
        })
        .collect()
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            source,
            grain,
            out,
            opacity,
            duration_multiplier,
            threads,
            quality,
            json,
        } => {
            setup_logging(cli.global.verbose)?;

            let source_frames = load_source(&source)?;
            let grain_frames = FrameSequence::from_directory(&grain)?;

            let mut options = GrainOptions::new(opacity)
                .with_duration_multiplier(duration_multiplier)
                .with_max_workers(threads)
                .with_jpeg_quality(quality);
            options.validate()?;
            prepare_output_folder(&out, cli.global.overwrite)?;

            let progress = if cli.global.progress {
                let total = indexer::total_iterations(source_frames.len(), duration_multiplier)?;
                let progress = Arc::new(TerminalProgress::new(u64::try_from(total)?)?);
                options = options.with_progress(progress.clone());
                Some(progress)
            } else {
                None
            };

            let report = BatchScheduler::new(options)
                .run(&source_frames, &grain_frames, &out)?
                .wait();

            if let Some(progress) = progress {
                progress.bar.finish_with_message("done");
            }

            if json {
                let failures: Vec<_> = report
                    .failures()
                    .map(|outcome| {
                        json!({
                            "iteration": outcome.iteration,
                            "output": outcome.output.display().to_string(),
                            "error": outcome
                                .result
                                .as_ref()
                                .err()
                                .map(ToString::to_string),
                        })
                    })
                    .collect();
                let payload = json!({
                    "total": report.total(),
                    "succeeded": report.succeeded(),
                    "failed": report.failed(),
                    "elapsed_seconds": report.elapsed().as_secs_f64(),
                    "output": out.display().to_string(),
                    "failures": failures,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if report.is_success() {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("Wrote {} frame(s) to {}", report.succeeded(), out.display()).green()
                );
            } else {
                println!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!(
                        "Wrote {} of {} frame(s) to {} ({} failed)",
                        report.succeeded(),
                        report.total(),
                        out.display(),
                        report.failed()
                    )
                    .yellow()
                );
            }
        }
        Commands::Plan {
            source_count,
            grain_count,
            duration_multiplier,
            json,
        } => {
            let rows = plan_rows(source_count, grain_count, duration_multiplier)?;
            if json {
                let payload: Vec<_> = rows
                    .iter()
                    .map(|(iteration, source, grain)| {
                        json!({ "iteration": iteration, "source": source, "grain": grain })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{:>9}  {:>6}  {:>5}", "iteration", "source", "grain");
                for (iteration, source, grain) in rows {
                    println!("{iteration:>9}  {source:>6}  {grain:>5}");
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "filmgrain", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, plan_rows, prepare_output_folder};
    use clap::CommandFactory;
    use filmgrain::GrainError;

    fn plan_error(source_count: usize, grain_count: usize, duration_multiplier: u32) -> GrainError {
        let error = plan_rows(source_count, grain_count, duration_multiplier)
            .expect_err("Expected plan to be rejected");
        *error
            .downcast::<GrainError>()
            .expect("Expected a GrainError")
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_rows_cycle_independently() {
        let rows = plan_rows(3, 2, 2).unwrap();
        let pairs: Vec<_> = rows.iter().map(|(_, source, grain)| (*source, *grain)).collect();
        assert_eq!(pairs, vec![(0, 0), (1, 1), (2, 0), (0, 1), (1, 0), (2, 1)]);
    }

    #[test]
    fn plan_rows_reject_empty_grain() {
        assert!(matches!(
            plan_error(3, 0, 1),
            GrainError::EmptySequence { sequence: "grain" }
        ));
    }

    #[test]
    fn plan_rows_reject_empty_source() {
        assert!(matches!(
            plan_error(0, 2, 1),
            GrainError::EmptySequence { sequence: "source" }
        ));
    }

    #[test]
    fn plan_rows_reject_zero_multiplier() {
        assert!(matches!(
            plan_error(3, 2, 0),
            GrainError::InvalidDurationMultiplier
        ));
    }

    #[test]
    fn plan_rows_report_empty_grain_before_zero_multiplier() {
        assert!(matches!(
            plan_error(3, 0, 0),
            GrainError::EmptySequence { sequence: "grain" }
        ));
    }

    #[test]
    fn output_folder_is_created() {
        let directory = tempfile::tempdir().unwrap();
        let out = directory.path().join("nested").join("out");
        prepare_output_folder(&out, false).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn non_empty_output_requires_overwrite() {
        let directory = tempfile::tempdir().unwrap();
        std::fs::write(directory.path().join("0.jpg"), b"old").unwrap();
        assert!(prepare_output_folder(directory.path(), false).is_err());
        assert!(prepare_output_folder(directory.path(), true).is_ok());
    }
}
