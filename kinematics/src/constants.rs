//! Physical constants and particle data shared by every channel.
//!
//! Masses are in GeV, following the units of the flux spectra.

/// Particle Data Group Monte Carlo numbering scheme code.
pub type PdgCode = i32;

/// Speed of light in vacuum, in metres per second.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

pub const NANOSECONDS_PER_SECOND: f64 = 1e9;

pub const MASS_ELECTRON: f64 = 0.000_510_998_950;
pub const MASS_MUON: f64 = 0.105_658_375_5;
pub const MASS_PION: f64 = 0.139_570_39;
pub const MASS_PI0: f64 = 0.134_976_8;

/// Reference mass of the heavy mediator in the three-product channels.
pub const MEDIATOR_MASS: f64 = 91.19;

pub const PDG_NONE: PdgCode = 0;
pub const PDG_ELECTRON: PdgCode = 11;
pub const PDG_NU_E: PdgCode = 12;
pub const PDG_MUON: PdgCode = 13;
pub const PDG_NU_MU: PdgCode = 14;
pub const PDG_NU_TAU: PdgCode = 16;
pub const PDG_GAMMA: PdgCode = 22;
pub const PDG_PI0: PdgCode = 111;
pub const PDG_PION: PdgCode = 211;

/// The sterile neutrino flux is treated as perfectly forward.
pub const FIXED_COS_THETA: f64 = 0.99999;

/// Rest mass of the particle with the given code. Neutrinos and the empty slot are massless.
pub fn rest_mass(pdg: PdgCode) -> f64 {
    match pdg.abs() {
        PDG_ELECTRON => MASS_ELECTRON,
        PDG_MUON => MASS_MUON,
        PDG_PION => MASS_PION,
        PDG_PI0 => MASS_PI0,
        _ => 0.0,
    }
}

/// True for products the detector cannot see.
pub fn is_invisible(pdg: PdgCode) -> bool {
    matches!(pdg.abs(), PDG_NONE | PDG_NU_E | PDG_NU_MU | PDG_NU_TAU)
}

pub fn charge_conjugate(pdg: PdgCode) -> PdgCode {
    match pdg {
        PDG_NONE | PDG_GAMMA | PDG_PI0 => pdg,
        _ => -pdg,
    }
}
