//! The `toonify process` command: cartoonize one photo or a directory.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use toonify_core::{Config, PhotoProcessor, ProcessOptions, ProcessingStats};

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Photo file or directory to cartoonize
    pub input: PathBuf,

    /// Directory for the cartoonized images (default: next to each source)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format override (png, jpeg, webp)
    #[arg(long)]
    pub format: Option<String>,

    /// Keep the model's output resolution instead of restoring each photo's
    /// aspect
    #[arg(long)]
    pub keep_size: bool,

    /// Print one JSON record per photo to stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(format) = &args.format {
        config.output.format = format.clone();
    }

    let processor = PhotoProcessor::new(&config)?;

    let files = processor.discover(&args.input);
    if files.is_empty() {
        anyhow::bail!("No supported photos found at {}", args.input.display());
    }

    let options = ProcessOptions {
        output_dir: args.output.clone(),
        keep_model_size: args.keep_size,
    };

    let progress = batch_progress(files.len());
    let start = Instant::now();
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for file in &files {
        progress.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        match processor.process(file, &options).await {
            Ok(record) => {
                succeeded += 1;
                if args.json {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed to cartoonize {}: {e}", file.display());
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let stats = ProcessingStats::from_run(succeeded, failed, start.elapsed());
    print_summary(&stats, files.len());

    if succeeded == 0 {
        anyhow::bail!("All {} photos failed", files.len());
    }
    Ok(())
}

fn batch_progress(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}

fn print_summary(stats: &ProcessingStats, total: usize) {
    eprintln!(
        "Cartoonized {}/{} photos in {:.1}s ({:.2}/s), {} failed",
        stats.succeeded, total, stats.total_seconds, stats.photos_per_second, stats.failed
    );
}
