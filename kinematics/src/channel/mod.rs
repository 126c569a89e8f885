//! The decay-channel menu and the kinematic models behind it.
mod mediator;
mod products;
mod two_body;

pub use mediator::{MediatorDecay, MediatorFinalState};
pub use products::{DecayProduct, DecayProducts};
pub use two_body::TwoBodyDecay;

use crate::{
    constants::{MASS_ELECTRON, MASS_MUON, MASS_PI0, MASS_PION, PdgCode, rest_mass},
    error::{ConfigError, KinematicError},
    factory::ModelParameters,
    kinematics::SterileNeutrino,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// The closed menu of decay channels. The discriminant is the integer tag used in
/// configuration files and in the model parameter vector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelId {
    /// N → ν μ⁺ μ⁻
    #[strum(to_string = "MUMU")]
    MuMu = 0,
    /// N → ν μ e
    #[strum(to_string = "MUE")]
    MuE = 1,
    /// N → e π
    #[strum(to_string = "ELECPI")]
    ElecPi = 2,
    /// N → μ π
    #[strum(to_string = "MUONPI")]
    MuonPi = 3,
    /// N → ν π0
    #[strum(to_string = "NUPI0")]
    NuPi0 = 4,
    /// N → ν e⁺ e⁻
    #[strum(to_string = "ELECPOSI")]
    ElecPosi = 5,
    /// N → ν γ
    #[strum(to_string = "GAMMA")]
    Gamma = 6,
}

impl TryFrom<i32> for ChannelId {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        ChannelId::iter()
            .find(|channel| channel.tag() == value)
            .ok_or(ConfigError::UnknownChannel(value))
    }
}

/// Which of the two decay entry points the generator calls for a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayPath {
    /// Masses come from the model's own parameters.
    Bound,
    /// Masses are supplied at call time.
    ExplicitMasses { mass_a: f64, mass_b: f64, aux: f64 },
}

impl ChannelId {
    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn decay_path(self) -> DecayPath {
        match self {
            Self::MuMu => DecayPath::ExplicitMasses {
                mass_a: MASS_MUON,
                mass_b: MASS_MUON,
                aux: 0.0,
            },
            Self::MuE => DecayPath::ExplicitMasses {
                mass_a: MASS_MUON,
                mass_b: MASS_ELECTRON,
                aux: 0.0,
            },
            Self::ElecPi | Self::MuonPi | Self::NuPi0 | Self::ElecPosi | Self::Gamma => {
                DecayPath::Bound
            }
        }
    }

    /// The smallest sterile mass for which the channel is open, with the daughter
    /// masses the generator actually uses.
    pub fn threshold(self) -> f64 {
        match self {
            Self::MuMu => 2.0 * MASS_MUON,
            Self::MuE => MASS_MUON + MASS_ELECTRON,
            Self::ElecPi => MASS_ELECTRON + MASS_PION,
            Self::MuonPi => MASS_MUON + MASS_PION,
            Self::NuPi0 => MASS_PI0,
            Self::ElecPosi => 2.0 * MASS_ELECTRON,
            Self::Gamma => 0.0,
        }
    }
}

/// A final-state particle slot of a channel model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Daughter {
    pub pdg: PdgCode,
    pub mass: f64,
}

impl Daughter {
    pub fn from_code(pdg: PdgCode) -> Self {
        Self {
            pdg,
            mass: rest_mass(pdg),
        }
    }
}

/// The kinematic model bound to one channel for a whole run.
///
/// Decays take `&self` and return their result by value, so a single model can be
/// shared between worker threads.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelModel {
    TwoBody(TwoBodyDecay),
    Mediator(MediatorDecay),
}

impl ChannelModel {
    pub fn id(&self) -> ChannelId {
        match self {
            Self::TwoBody(model) => model.channel(),
            Self::Mediator(model) => model.channel(),
        }
    }

    pub fn parameters(&self) -> &ModelParameters {
        match self {
            Self::TwoBody(model) => model.parameters(),
            Self::Mediator(model) => model.parameters(),
        }
    }

    /// Decays `parent` using the daughter masses bound into the model.
    pub fn decay<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        match self {
            Self::TwoBody(model) => model.decay(parent, rng),
            Self::Mediator(model) => model.decay(parent, rng),
        }
    }

    /// Decays `parent` with the daughter masses supplied by the caller.
    /// For mediator channels `aux` is the mediator width, two-body channels ignore it.
    pub fn decay_with_masses<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        mass_a: f64,
        mass_b: f64,
        aux: f64,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        match self {
            Self::TwoBody(model) => model.decay_with_masses(parent, mass_a, mass_b, rng),
            Self::Mediator(model) => model.decay_with_masses(parent, mass_a, mass_b, aux, rng),
        }
    }
}
