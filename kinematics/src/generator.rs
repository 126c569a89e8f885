//! Assembly of complete events: parent sampling, decay, vertex and timing.
use crate::{
    channel::{ChannelModel, DecayPath},
    constants::{FIXED_COS_THETA, NANOSECONDS_PER_SECOND, SPEED_OF_LIGHT},
    error::{EventError, KinematicError},
    flux::FluxSampler,
    kinematics::SterileNeutrino,
    observables::Observables,
    random::flat,
    settings::Settings,
};
use hnl_common::{
    Energy, Length,
    metrics::{names, rejections::get_label},
};
use metrics::counter;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, ops::RangeInclusive};
use tracing::{debug, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    pub fn range_inclusive(&self) -> RangeInclusive<T> {
        self.min..=self.max
    }

    pub fn is_in(&self, value: T) -> bool {
        self.range_inclusive().contains(&value)
    }
}

impl Interval<f64> {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Maps a flat draw onto the interval.
    pub fn at(&self, u: f64) -> f64 {
        self.min + self.width() * u
    }
}

/// The box, in detector coordinates (cm), in which decay vertices are placed.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FiducialVolume {
    pub x: Interval<Length>,
    pub y: Interval<Length>,
    pub z: Interval<Length>,
}

impl FiducialVolume {
    pub const DETECTOR: FiducialVolume = FiducialVolume {
        x: Interval {
            min: 10.0,
            max: 246.35,
        },
        y: Interval {
            min: -105.53,
            max: 107.47,
        },
        z: Interval {
            min: 10.1,
            max: 1026.9,
        },
    };

    /// Draws a vertex uniformly in the box, consuming three flats in x, y, z order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (Length, Length, Length) {
        let x = self.x.at(flat(rng));
        let y = self.y.at(flat(rng));
        let z = self.z.at(flat(rng));
        (x, y, z)
    }

    pub fn contains(&self, (x, y, z): (Length, Length, Length)) -> bool {
        self.x.is_in(x) && self.y.is_in(y) && self.z.is_in(z)
    }
}

/// Azimuth of the parent about the beam axis, uniform in [0, 2π). Consumes one flat.
pub fn draw_azimuth<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    2.0 * PI * flat(rng)
}

/// Extra flight time, in seconds, of a particle of `mass` and `energy` over `distance`
/// metres compared with a massless one.
pub fn time_of_flight_delay(
    distance: f64,
    energy: Energy,
    mass: f64,
) -> Result<f64, KinematicError> {
    let below_shell = KinematicError::BelowMassShell { energy, mass };
    if energy <= mass {
        return Err(below_shell);
    }
    let momentum = ((energy - mass) * (energy + mass)).sqrt();
    let delay = distance / SPEED_OF_LIGHT * (energy / momentum - 1.0);
    if delay.is_finite() {
        Ok(delay)
    } else {
        Err(below_shell)
    }
}

/// Generates one event for the channel bound to `model`.
///
/// Random draws are made in a fixed order: azimuth, energy (as many as the
/// flux needs), the decay, the charge-conjugation choice, the vertex x, y, z,
/// and finally the position in the beam window.
#[instrument(skip_all, level = "trace", fields(channel = %model.id()))]
pub fn generate_event<R, F>(
    rng: &mut R,
    model: &ChannelModel,
    flux: &F,
    settings: &Settings,
) -> Result<Observables, EventError>
where
    R: Rng + ?Sized,
    F: FluxSampler,
{
    let phi = draw_azimuth(rng);
    let energy = flux.draw_energy(rng);
    let sterile = SterileNeutrino::new(settings.sterile_mass, energy, FIXED_COS_THETA, phi)?;

    let products = match model.id().decay_path() {
        DecayPath::Bound => model.decay(&sterile, rng)?,
        DecayPath::ExplicitMasses {
            mass_a,
            mass_b,
            aux,
        } => model.decay_with_masses(&sterile, mass_a, mass_b, aux, rng)?,
    };

    let mut observables = Observables::default();
    products.fill_observables(&mut observables, rng);
    observables.e_sterile = sterile.energy();
    observables.cos_theta_sterile = sterile.cos_theta();

    let delay = time_of_flight_delay(settings.distance, sterile.energy(), sterile.mass())?
        * NANOSECONDS_PER_SECOND;

    (observables.x_pos, observables.y_pos, observables.z_pos) =
        FiducialVolume::DETECTOR.sample(rng);
    observables.time = settings.global_time_offset + settings.beam_window * flat(rng) + delay;
    Ok(observables)
}

/// Generates one event, resampling it from scratch whenever a draw lands outside
/// the kinematically allowed region. Returns the event and the number of attempts used.
#[instrument(skip_all, level = "trace")]
pub fn generate_event_with_retries<R, F>(
    rng: &mut R,
    model: &ChannelModel,
    flux: &F,
    settings: &Settings,
    max_attempts: usize,
) -> Result<(Observables, usize), EventError>
where
    R: Rng + ?Sized,
    F: FluxSampler,
{
    let mut last = KinematicError::SamplingExhausted(0);
    for attempt in 1..=max_attempts {
        match generate_event(rng, model, flux, settings) {
            Ok(observables) => {
                counter!(names::EVENTS_GENERATED).increment(1);
                return Ok((observables, attempt));
            }
            Err(EventError::Kinematic(error)) => {
                debug!(attempt, %error, "Event rejected, resampling");
                counter!(
                    names::EVENTS_REJECTED,
                    &[get_label(error.rejection_kind())]
                )
                .increment(1);
                last = error;
            }
            Err(error) => return Err(error),
        }
    }
    warn!(max_attempts, %last, "Event abandoned");
    counter!(names::EVENTS_FAILED).increment(1);
    Err(EventError::AttemptsExhausted {
        attempts: max_attempts,
        last,
    })
}
