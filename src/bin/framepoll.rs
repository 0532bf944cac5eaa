use std::{
    fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framepoll::capture::OpenCvBackend;
use framepoll::{
    CompletionCallback, ConsoleLogger, FrameContext, FramePoller, FrameSink, PollError,
    PollLogger, PropertyValue, RunSummary, SilentLogger, SourceSelector,
};
use indicatif::{ProgressBar, ProgressStyle};
use opencv::core::{Mat, Vector};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framepoll run --webcam 0 --every 10 --max-frames 100\n  framepoll run --file input.mp4 --save-dir frames --ext jpg --progress\n  framepoll probe --file input.mp4 --json\n  framepoll completions zsh > _framepoll";

#[derive(Debug, Parser)]
#[command(
    name = "framepoll",
    version,
    about = "Poll frames from cameras and video files",
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
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Prepend a wall-clock timestamp to every log line.
    #[arg(long)]
    timestamps: bool,

    /// Suppress poller log output.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Parser, Clone, Default)]
struct SourceArgs {
    /// Webcam device index to poll.
    #[arg(long)]
    webcam: Option<i32>,

    /// Video file to poll.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl SourceArgs {
    fn selector(&self) -> Result<SourceSelector, PollError> {
        SourceSelector::from_options(self.webcam, self.file.clone())
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll a source and handle sampled frames.
    #[command(
        about = "Poll frames from a webcam or video file",
        after_help = "Examples:\n  framepoll run --webcam 0 --every 5\n  framepoll run --file input.mp4 --save-dir frames --progress"
    )]
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Handle every Nth frame.
        #[arg(long, default_value_t = 1)]
        every: u64,

        /// Stop after this many handled frames.
        #[arg(long)]
        max_frames: Option<u64>,

        /// Save handled frames into this directory.
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Image extension for saved frames (png, jpg, bmp).
        #[arg(long, default_value = "png")]
        ext: String,

        /// Show a progress bar (file sources with a known frame count).
        #[arg(long)]
        progress: bool,
    },

    /// Print source metadata (alias: info).
    #[command(
        about = "Print webcam or video file metadata",
        visible_alias = "info",
        after_help = "Examples:\n  framepoll probe --webcam 0\n  framepoll probe --file input.mp4 --json"
    )]
    Probe {
        #[command(flatten)]
        source: SourceArgs,

        /// Output metadata as machine-readable JSON.
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

/// Render a playback position in milliseconds as `HH:MM:SS.mmm`.
fn format_position(position_millis: f64) -> String {
    let total_millis = position_millis.max(0.0) as u64;
    let millis = total_millis % 1_000;
    let seconds = (total_millis / 1_000) % 60;
    let minutes = (total_millis / 60_000) % 60;
    let hours = total_millis / 3_600_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Normalize a user-supplied image extension (strip dots, lowercase).
fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

fn build_logger(global: &GlobalOptions) -> Arc<dyn PollLogger> {
    if global.quiet {
        Arc::new(SilentLogger)
    } else {
        Arc::new(ConsoleLogger)
    }
}

/// The frame handler behind `framepoll run`: prints, saves, and advances the
/// progress bar, depending on what was asked for.
struct CliSink {
    print: bool,
    save_dir: Option<PathBuf>,
    extension: String,
    progress: Option<ProgressBar>,
    saved: AtomicU64,
}

impl FrameSink<Mat> for CliSink {
    fn on_frame(&self, frame: &Mat, context: &FrameContext<'_>) -> Result<(), PollError> {
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }

        if self.print {
            println!(
                "frame #{:<6} @ {}",
                context.frame_number,
                format_position(context.position_millis)
            );
        }

        if let Some(directory) = &self.save_dir {
            let output_path = directory.join(format!(
                "frame_{:06}.{}",
                context.frame_number, self.extension
            ));
            let written = opencv::imgcodecs::imwrite(
                &output_path.to_string_lossy(),
                frame,
                &Vector::<i32>::new(),
            )
            .map_err(PollError::sink)?;
            if !written {
                return Err(PollError::sink(format!(
                    "failed to write {}",
                    output_path.display()
                )));
            }
            self.saved.fetch_add(1, Ordering::Relaxed);
        }

        Ok(())
    }
}

/// Prints a colored one-line summary when a run finishes.
struct SummaryPrinter;

impl CompletionCallback for SummaryPrinter {
    fn on_finished(&self, summary: &RunSummary) {
        if summary.source_opened {
            let suffix = if summary.stopped { " (stopped)" } else { "" };
            println!(
                "{} {}",
                "done:".green().bold(),
                format!(
                    "{} frame(s) read, {} handled{suffix}",
                    summary.frames_read, summary.frames_dispatched
                )
                .green()
            );
        } else {
            eprintln!(
                "{} {}",
                "failed:".red().bold(),
                "video source did not open".red()
            );
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            every,
            max_frames,
            save_dir,
            ext,
            progress,
        } => {
            let selector = source.selector()?;

            if let Some(directory) = &save_dir {
                fs::create_dir_all(directory)?;
            }

            let progress_bar = if progress {
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                Some(ProgressBar::new(0).with_style(style.progress_chars("##-")))
            } else {
                None
            };

            let sink = Arc::new(CliSink {
                print: !progress,
                save_dir: save_dir.clone(),
                extension: normalize_extension(&ext),
                progress: progress_bar.clone(),
                saved: AtomicU64::new(0),
            });

            let mut poller = FramePoller::new(OpenCvBackend, sink.clone())
                .with_sample_stride(every)
                .with_max_frames(max_frames)
                .with_completion(Arc::new(SummaryPrinter))
                .with_logger(build_logger(&cli.global))
                .with_verbose(cli.global.verbose)
                .with_timestamp_logs(cli.global.timestamps);

            let control = poller.control();
            ctrlc::set_handler(move || {
                eprintln!("Interrupted, exiting");
                control.request_stop();
            })?;

            // Size the bar from the file's frame count before polling starts.
            if let Some(bar) = &progress_bar {
                let frame_count = poller
                    .query(selector.clone())?
                    .and_then(|info| info.frame_count());
                if let Some(count) = frame_count {
                    let mut expected = (count as u64) / every.max(1);
                    if let Some(limit) = max_frames {
                        expected = expected.min(limit);
                    }
                    bar.set_length(expected);
                }
            }

            poller.process(selector)?;

            if let Some(bar) = progress_bar {
                bar.finish_with_message("done");
            }

            let saved = sink.saved.load(Ordering::Relaxed);
            if let Some(directory) = &save_dir {
                println!(
                    "{} {}",
                    "saved:".green().bold(),
                    format!("{saved} frame(s) to {}", directory.display()).green()
                );
            }
        }
        Commands::Probe { source, json } => {
            let selector = source.selector()?;

            struct DiscardFrames;
            impl FrameSink<Mat> for DiscardFrames {
                fn on_frame(&self, _: &Mat, _: &FrameContext<'_>) -> Result<(), PollError> {
                    Ok(())
                }
            }

            let mut poller = FramePoller::new(OpenCvBackend, Arc::new(DiscardFrames))
                .with_logger(build_logger(&cli.global))
                .with_verbose(cli.global.verbose)
                .with_timestamp_logs(cli.global.timestamps);

            let info = poller
                .query(selector)?
                .ok_or("video source did not open")?;

            if json {
                let payload: serde_json::Value = info
                    .iter()
                    .map(|(key, value)| {
                        let rendered = match value {
                            PropertyValue::Number(number) => json!(number),
                            PropertyValue::Text(text) => json!(text),
                        };
                        (key.to_string(), rendered)
                    })
                    .collect::<serde_json::Map<String, serde_json::Value>>()
                    .into();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (key, value) in info.iter() {
                    println!("{key}: {value}");
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framepoll", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
