//! Energy spectra of the sterile neutrino flux arriving at the detector.
use crate::{
    error::{ConfigError, FluxError},
    random::flat,
};
use hnl_common::Energy;
use rand::{Rng, distr::weighted::WeightedIndex};
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::io::Read;
use tracing::info;

/// Draws sterile neutrino energies. Implementations are shared read-only between
/// workers, each of which supplies its own engine.
pub trait FluxSampler {
    fn draw_energy<R: Rng + ?Sized>(&self, rng: &mut R) -> Energy;
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FluxBin {
    pub low: Energy,
    pub high: Energy,
    pub weight: f64,
}

/// The spectrum as written in the flux configuration file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "flux-type")]
pub enum FluxSpectrum {
    Monoenergetic { energy: Energy },
    Gaussian { mean: Energy, sd: Energy },
    Tabulated { bins: Vec<FluxBin> },
}

impl FluxSpectrum {
    pub fn validate(&self) -> Result<(), FluxError> {
        match self {
            Self::Monoenergetic { energy } => {
                if !(energy.is_finite() && *energy > 0.0) {
                    return Err(FluxError::InvalidParameter {
                        name: "energy",
                        value: *energy,
                    });
                }
            }
            Self::Gaussian { mean, sd } => {
                if !mean.is_finite() {
                    return Err(FluxError::InvalidParameter {
                        name: "mean",
                        value: *mean,
                    });
                }
                if !(sd.is_finite() && *sd > 0.0) {
                    return Err(FluxError::InvalidParameter {
                        name: "sd",
                        value: *sd,
                    });
                }
            }
            Self::Tabulated { bins } => {
                if bins.is_empty() {
                    return Err(FluxError::Empty);
                }
                for bin in bins {
                    if !(bin.low.is_finite() && bin.high.is_finite() && bin.low < bin.high) {
                        return Err(FluxError::DegenerateBin {
                            low: bin.low,
                            high: bin.high,
                        });
                    }
                    if !(bin.weight.is_finite() && bin.weight >= 0.0) {
                        return Err(FluxError::InvalidWeight(bin.weight));
                    }
                }
                if bins.iter().all(|bin| bin.weight == 0.0) {
                    return Err(FluxError::ZeroWeight);
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum Sampler {
    Monoenergetic(Energy),
    Gaussian(Normal<f64>),
    Tabulated {
        bins: Vec<FluxBin>,
        index: WeightedIndex<f64>,
    },
}

/// A validated spectrum, ready to sample.
#[derive(Clone, Debug)]
pub struct FluxFile {
    spectrum: FluxSpectrum,
    sampler: Sampler,
}

impl FluxFile {
    pub fn new(spectrum: FluxSpectrum) -> Result<Self, FluxError> {
        spectrum.validate()?;
        let sampler = match &spectrum {
            FluxSpectrum::Monoenergetic { energy } => Sampler::Monoenergetic(*energy),
            FluxSpectrum::Gaussian { mean, sd } => {
                Sampler::Gaussian(Normal::new(*mean, *sd).map_err(|_| {
                    FluxError::InvalidParameter {
                        name: "sd",
                        value: *sd,
                    }
                })?)
            }
            FluxSpectrum::Tabulated { bins } => Sampler::Tabulated {
                bins: bins.clone(),
                index: WeightedIndex::new(bins.iter().map(|bin| bin.weight))
                    .map_err(|_| FluxError::ZeroWeight)?,
            },
        };
        Ok(Self { spectrum, sampler })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let spectrum: FluxSpectrum = serde_json::from_reader(reader)?;
        let flux = Self::new(spectrum)?;
        info!(
            minimum = flux.minimum_energy(),
            maximum = flux.maximum_energy(),
            "Flux spectrum loaded"
        );
        Ok(flux)
    }

    /// Lowest energy the spectrum can produce.
    pub fn minimum_energy(&self) -> Energy {
        match &self.spectrum {
            FluxSpectrum::Monoenergetic { energy } => *energy,
            FluxSpectrum::Gaussian { .. } => f64::NEG_INFINITY,
            FluxSpectrum::Tabulated { bins } => bins
                .iter()
                .filter(|bin| bin.weight > 0.0)
                .map(|bin| bin.low)
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Highest energy the spectrum can produce.
    pub fn maximum_energy(&self) -> Energy {
        match &self.spectrum {
            FluxSpectrum::Monoenergetic { energy } => *energy,
            FluxSpectrum::Gaussian { .. } => f64::INFINITY,
            FluxSpectrum::Tabulated { bins } => bins
                .iter()
                .filter(|bin| bin.weight > 0.0)
                .map(|bin| bin.high)
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl FluxSampler for FluxFile {
    fn draw_energy<R: Rng + ?Sized>(&self, rng: &mut R) -> Energy {
        match &self.sampler {
            Sampler::Monoenergetic(energy) => *energy,
            Sampler::Gaussian(normal) => normal.sample(rng),
            Sampler::Tabulated { bins, index } => {
                // `index` was built from `bins`, so the lookup always succeeds.
                let Some(bin) = bins.get(index.sample(rng)) else {
                    return f64::NAN;
                };
                bin.low + (bin.high - bin.low) * flat(rng)
            }
        }
    }
}
