//! Event kinematics for heavy sterile neutrinos decaying inside a detector.
//!
//! A run binds one decay channel to a [ChannelModel] through [build_channel], then
//! calls [generate_event] (or [generate_event_with_retries]) once per event with a
//! random engine owned by the caller.
pub mod channel;
pub mod constants;
pub mod error;
pub mod factory;
pub mod flux;
pub mod generator;
pub mod kinematics;
pub mod observables;
pub mod random;
pub mod settings;

pub use channel::{ChannelId, ChannelModel};
pub use error::{ConfigError, EventError, FluxError, KinematicError};
pub use factory::{ModelParameters, build_channel};
pub use flux::{FluxFile, FluxSampler, FluxSpectrum};
pub use generator::{FiducialVolume, generate_event, generate_event_with_retries};
pub use observables::Observables;
pub use settings::Settings;
