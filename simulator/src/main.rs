mod batch;

use anyhow::{Context, Result};
use batch::{BatchOptions, RunSummary, run_batch};
use clap::Parser;
use hnl_common::{
    init_tracer,
    metrics::{component_info_metric, describe_event_metrics},
};
use hnl_kinematics::{FluxFile, Settings, build_channel};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{fs::File, net::SocketAddr, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Run settings: decay channel, sterile mass, distance and timing
    #[clap(long, env)]
    settings: PathBuf,

    /// Sterile neutrino energy spectrum
    #[clap(long, env)]
    flux: PathBuf,

    /// Number of events to generate
    #[clap(long, default_value = "1000")]
    events: usize,

    /// Seed of the master random engine
    #[clap(long, default_value = "0")]
    seed: u64,

    /// Number of events generated by each independently seeded engine
    #[clap(long, default_value = "1000")]
    chunk_size: usize,

    /// Size of the worker pool, defaults to the number of cores
    #[clap(long)]
    workers: Option<usize>,

    /// Attempts at one event before it is dropped
    #[clap(long, default_value = "1000")]
    max_attempts: usize,

    /// If set, metrics are served for Prometheus on this address
    #[clap(long, env)]
    observability_address: Option<SocketAddr>,

    #[clap(long, env, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(args.log_level);

    if let Some(address) = args.observability_address {
        PrometheusBuilder::new()
            .with_http_listener(address)
            .install()
            .context("Prometheus metrics exporter should be set up")?;
    }
    component_info_metric("hnl-simulator");
    describe_event_metrics();

    let settings = Settings::from_reader(
        File::open(&args.settings)
            .with_context(|| format!("Cannot open {}", args.settings.display()))?,
    )
    .with_context(|| format!("Invalid settings in {}", args.settings.display()))?;
    let flux = FluxFile::from_reader(
        File::open(&args.flux).with_context(|| format!("Cannot open {}", args.flux.display()))?,
    )
    .with_context(|| format!("Invalid flux in {}", args.flux.display()))?;

    let (model, parameters) = build_channel(settings.decay_channel, &settings)
        .context("Cannot build the decay channel")?;
    info!(
        channel = %model.id(),
        parameters = ?parameters.as_slice(),
        "Channel ready"
    );

    if let Some(workers) = args.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Worker pool should be built")?;
    }

    let stats = run_batch(
        &model,
        &flux,
        &settings,
        BatchOptions {
            events: args.events,
            chunk_size: args.chunk_size,
            seed: args.seed,
            max_attempts: args.max_attempts,
        },
    );

    let summary = RunSummary::from(&stats);
    info!(
        service = tracer.service_name(),
        produced = summary.produced,
        failures = summary.failures,
        attempts = summary.attempts,
        mean_sterile_energy = summary.mean_sterile_energy,
        mean_time = summary.mean_time,
        earliest = ?summary.earliest,
        latest = ?summary.latest,
        "Run complete"
    );
    Ok(())
}
