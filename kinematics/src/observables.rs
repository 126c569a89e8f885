use crate::{channel::ChannelId, constants::PdgCode};
use hnl_common::{Energy, Length, Nanoseconds};
use serde::Serialize;

/// The output record of one generated event.
///
/// The decay-product fields are written by [crate::channel::DecayProducts::fill_observables]
/// and depend on the channel:
///
/// | Channel | `*_high` / `*_low` |
/// |---|---|
/// | ELECPI, MUONPI | charged lepton and charged pion, ordered by energy |
/// | ELECPOSI, MUMU, MUE | the two charged leptons, ordered by energy |
/// | NUPI0 | the π0; the low fields stay zero as the neutrino is invisible |
/// | GAMMA | the photon; the low fields stay zero as the neutrino is invisible |
///
/// Angles are stored as cosines relative to the beam (z) axis.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Observables {
    pub channel: Option<ChannelId>,
    /// Energy of the visible system.
    pub e_sum: Energy,
    pub cos_theta_sum: f64,
    /// Cosine of the angle between the two visible products, zero if only one is visible.
    pub cos_opening_angle: f64,
    pub invariant_mass: f64,
    pub e_high: Energy,
    pub cos_theta_high: f64,
    pub pdg_high: PdgCode,
    pub e_low: Energy,
    pub cos_theta_low: f64,
    pub pdg_low: PdgCode,
    pub e_sterile: Energy,
    pub cos_theta_sterile: f64,
    pub x_pos: Length,
    pub y_pos: Length,
    pub z_pos: Length,
    /// Absolute event time.
    pub time: Nanoseconds,
}
