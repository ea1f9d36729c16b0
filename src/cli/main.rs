use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use image_metadata::extract::FileProbe;
use image_metadata::{config, pipeline, report};

#[derive(Parser, Debug)]
#[command(
    name = "image-metadata",
    version,
    about = "Extract basic info, EXIF tags and GPS data from a batch of images"
)]
struct Cli {
    /// Image files or directories to process (default: current directory)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Save all metadata to image_metadata_<timestamp>.json
    #[arg(long)]
    save: bool,

    /// Directory for the saved JSON file
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Walk directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Print the whole batch as JSON to stdout instead of the text report
    #[arg(long)]
    json: bool,

    /// Suppress the per-file text report
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Load config, then let flags override it
    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.recursive {
        config.discovery.recursive = true;
    }
    if cli.save {
        config.output.save_json = true;
    }
    if cli.output_dir.is_some() {
        config.output.output_dir = cli.output_dir.clone();
    }
    if cli.quiet || cli.json {
        config.output.print_report = false;
    }

    let paths = if cli.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths.clone()
    };

    // Collect images
    let images = pipeline::collect_images(&paths, &config.discovery);
    if images.is_empty() {
        anyhow::bail!(
            "No image files found. Supported extensions: {}",
            config.discovery.extensions.join(", ")
        );
    }

    log::info!("Processing {} image(s)...", images.len());

    let total = images.len();
    let batch = pipeline::run_batch(&images, &FileProbe, |i, record| {
        log::info!("[{}/{}] {}", i + 1, total, record.filename);
        if let Some(ref err) = record.error {
            log::error!("  Error: {err}");
        }
        if config.output.print_report {
            print!("{}", report::render_record(record, config.output.max_display_len));
        }
    });

    // JSON output
    if cli.json {
        println!("{}", pipeline::to_json(&batch)?);
    }

    // A failed save is reported but does not fail the run.
    if config.output.save_json {
        match pipeline::save_json(&batch, &config.output_dir()) {
            Ok(path) => log::info!("Metadata saved to {}", path.display()),
            Err(e) => log::error!("{e}"),
        }
    }

    // Summary
    let summary = pipeline::BatchSummary::of(&batch);
    log::info!(
        "Done: {} succeeded, {} failed out of {} images",
        summary.succeeded,
        summary.failed,
        summary.total
    );

    Ok(())
}
