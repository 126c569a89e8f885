use hnl_common::metrics::rejections::RejectionKind;
use thiserror::Error;

/// Problems with the run configuration. These are fatal: no channel is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bad channel specifier: {0} is not a known decay channel")]
    UnknownChannel(i32),
    #[error(
        "Sterile mass {mass} GeV cannot decay via {channel}: the channel opens at {threshold} GeV"
    )]
    BelowThreshold {
        channel: String,
        mass: f64,
        threshold: f64,
    },
    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: f64 },
    #[error("Invalid Flux: {0}")]
    Flux(#[from] FluxError),
    /// Covers read failures of the underlying reader as well as malformed JSON.
    #[error("Cannot read configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kinematically forbidden or numerically undefined configurations met while
/// generating one event. These are local to the event.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KinematicError {
    #[error("Energy {energy} GeV is not above the sterile mass {mass} GeV")]
    BelowMassShell { energy: f64, mass: f64 },
    #[error("Phase space is closed: parent mass {parent} GeV below daughter masses {daughters} GeV")]
    KinematicallyClosed { parent: f64, daughters: f64 },
    #[error("No phase-space point accepted after {0} attempts")]
    SamplingExhausted(usize),
}

impl KinematicError {
    pub fn rejection_kind(&self) -> RejectionKind {
        match self {
            Self::BelowMassShell { .. } => RejectionKind::BelowMassShell,
            Self::KinematicallyClosed { .. } => RejectionKind::KinematicallyClosed,
            Self::SamplingExhausted(_) => RejectionKind::SamplingExhausted,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FluxError {
    #[error("Tabulated flux has no bins")]
    Empty,
    #[error("Flux bin [{low}, {high}] is empty or inverted")]
    DegenerateBin { low: f64, high: f64 },
    #[error("Flux weight {0} is negative or not finite")]
    InvalidWeight(f64),
    #[error("Flux weights sum to zero")]
    ZeroWeight,
    #[error("Invalid flux parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EventError {
    #[error("{0}")]
    Kinematic(#[from] KinematicError),
    #[error("Event abandoned after {attempts} attempts, last rejection: {last}")]
    AttemptsExhausted {
        attempts: usize,
        last: KinematicError,
    },
}
