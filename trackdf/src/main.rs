//! `triplets` binary: build the labeled triplet table from a hit table.
//!
//! ```bash
//! triplets --input data_075.csv --output resultado.csv
//! triplets --config run.json --threads 8 --summary summary.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use trackcore::algorithm::labeler::LabelPolicy;
use trackdf::pipeline::config::PipelineConfig;
use trackdf::pipeline::driver;

#[derive(Parser, Debug)]
#[command(name = "triplets", version, about = "Build labeled hit triplets for track seeding", long_about = None)]
struct Args {
    /// JSON configuration file; flags below override its fields.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Hit table to read (default: data_075.csv).
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Triplet table to write (default: resultado.csv).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a JSON run summary to this file.
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Innermost base layer.
    #[arg(long)]
    first_layer: Option<i32>,

    /// Outermost base layer.
    #[arg(long)]
    last_layer: Option<i32>,

    /// Bound on |z0| of a duplet.
    #[arg(long)]
    max_z0: Option<f64>,

    /// Bound on |Δφ/Δr| of a duplet.
    #[arg(long)]
    max_slope: Option<f64>,

    /// Bound on the 3-D break angle, radians.
    #[arg(long)]
    max_theta_break: Option<f64>,

    /// Bound on the (z, r) break angle, radians.
    #[arg(long)]
    max_phi_break: Option<f64>,

    /// Label triplets containing a noise hit (particle id 0) as background.
    #[arg(long, default_value_t = false)]
    noise_is_background: bool,

    /// Worker threads (default: all cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.summary.is_some() {
            config.summary = self.summary;
        }
        if let Some(l) = self.first_layer {
            config.first_base_layer = l;
        }
        if let Some(l) = self.last_layer {
            config.last_base_layer = l;
        }
        if let Some(v) = self.max_z0 {
            config.search.duplet.max_abs_z0 = v;
        }
        if let Some(v) = self.max_slope {
            config.search.duplet.max_abs_slope = v;
        }
        if let Some(v) = self.max_theta_break {
            config.search.triplet.max_theta_break = v;
        }
        if let Some(v) = self.max_phi_break {
            config.search.triplet.max_phi_break = v;
        }
        if self.noise_is_background {
            config.search.label_policy = LabelPolicy::NoiseIsBackground;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let base = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            match PipelineConfig::from_json(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    error!("Failed to load configuration: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => PipelineConfig::default(),
    };
    let config = args.apply(base);

    match driver::run(&config) {
        Ok(summary) => {
            info!(
                "Processed {} hits ({} rows skipped), {} triplets",
                summary.valid_hits, summary.row_errors, summary.triplets
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
