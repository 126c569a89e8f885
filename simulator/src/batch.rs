use hnl_kinematics::{
    ChannelModel, EventError, FluxSampler, Observables, Settings, generate_event_with_retries,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{instrument, warn};

/// How a batch is divided and seeded.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BatchOptions {
    pub(crate) events: usize,
    pub(crate) chunk_size: usize,
    pub(crate) seed: u64,
    pub(crate) max_attempts: usize,
}

/// Per-chunk seeds, drawn in order from a master engine so that the event stream
/// depends only on the run seed and not on how chunks are scheduled.
fn chunk_seeds(seed: u64, chunks: usize) -> Vec<u64> {
    let mut master = StdRng::seed_from_u64(seed);
    (0..chunks).map(|_| master.random::<u64>()).collect()
}

/// Running totals over the events of a chunk or of a whole batch.
/// Events are folded in as they are produced and never stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct BatchStats {
    pub(crate) produced: usize,
    pub(crate) attempts: usize,
    pub(crate) failures: usize,
    sterile_energy_sum: f64,
    time_sum: f64,
    earliest: Option<f64>,
    latest: Option<f64>,
}

impl BatchStats {
    fn record(&mut self, event: &Observables) {
        self.produced += 1;
        self.sterile_energy_sum += event.e_sterile;
        self.time_sum += event.time;
        self.earliest = Some(self.earliest.map_or(event.time, |t| t.min(event.time)));
        self.latest = Some(self.latest.map_or(event.time, |t| t.max(event.time)));
    }

    fn merge(self, other: BatchStats) -> BatchStats {
        let pick = |a: Option<f64>, b: Option<f64>, f: fn(f64, f64) -> f64| match (a, b) {
            (Some(a), Some(b)) => Some(f(a, b)),
            (a, b) => a.or(b),
        };
        BatchStats {
            produced: self.produced + other.produced,
            attempts: self.attempts + other.attempts,
            failures: self.failures + other.failures,
            sterile_energy_sum: self.sterile_energy_sum + other.sterile_energy_sum,
            time_sum: self.time_sum + other.time_sum,
            earliest: pick(self.earliest, other.earliest, f64::min),
            latest: pick(self.latest, other.latest, f64::max),
        }
    }
}

/// Generates `events` events from an engine seeded with `seed`, handing each one
/// to `on_event`. Returns the attempt and failure counts.
#[instrument(skip_all, level = "trace", fields(events = events))]
fn run_chunk<F: FluxSampler>(
    seed: u64,
    events: usize,
    model: &ChannelModel,
    flux: &F,
    settings: &Settings,
    max_attempts: usize,
    mut on_event: impl FnMut(Observables),
) -> (usize, usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut total_attempts, mut failures) = (0, 0);
    for _ in 0..events {
        match generate_event_with_retries(&mut rng, model, flux, settings, max_attempts) {
            Ok((observables, attempts)) => {
                on_event(observables);
                total_attempts += attempts;
            }
            Err(error) => {
                if let EventError::AttemptsExhausted { attempts, .. } = &error {
                    total_attempts += attempts;
                }
                warn!(%error, "Event dropped");
                failures += 1;
            }
        }
    }
    (total_attempts, failures)
}

/// Generates `options.events` events across the rayon thread pool and returns
/// their combined statistics. Chunks are merged in chunk order.
pub(crate) fn run_batch<F: FluxSampler + Sync>(
    model: &ChannelModel,
    flux: &F,
    settings: &Settings,
    options: BatchOptions,
) -> BatchStats {
    let chunk_size = options.chunk_size.max(1);
    let chunks = options.events.div_ceil(chunk_size);
    chunk_seeds(options.seed, chunks)
        .into_iter()
        .enumerate()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(index, seed)| {
            let events = chunk_size.min(options.events - index * chunk_size);
            let mut stats = BatchStats::default();
            let (attempts, failures) = run_chunk(
                seed,
                events,
                model,
                flux,
                settings,
                options.max_attempts,
                |event| stats.record(&event),
            );
            stats.attempts = attempts;
            stats.failures = failures;
            stats
        })
        .collect::<Vec<_>>()
        .into_iter()
        .fold(BatchStats::default(), BatchStats::merge)
}

/// Aggregate figures logged at the end of a run. The time range is absent when
/// no event was produced.
#[derive(Debug, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) produced: usize,
    pub(crate) failures: usize,
    pub(crate) attempts: usize,
    pub(crate) mean_sterile_energy: f64,
    pub(crate) mean_time: f64,
    pub(crate) earliest: Option<f64>,
    pub(crate) latest: Option<f64>,
}

impl From<&BatchStats> for RunSummary {
    fn from(stats: &BatchStats) -> Self {
        let mean = |sum: f64| {
            if stats.produced == 0 {
                0.0
            } else {
                sum / stats.produced as f64
            }
        };
        Self {
            produced: stats.produced,
            failures: stats.failures,
            attempts: stats.attempts,
            mean_sterile_energy: mean(stats.sterile_energy_sum),
            mean_time: mean(stats.time_sum),
            earliest: stats.earliest,
            latest: stats.latest,
        }
    }
}
