//! Relativistic kinematics: four-momenta, Lorentz boosts and the sterile
//! neutrino value object that drives every decay.
use crate::{error::KinematicError, random::flat};
use hnl_common::Energy;
use rand::Rng;
use std::{f64::consts::PI, ops::Add};

/// A four-momentum in the lab frame. Components are in GeV, z is the beam axis.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FourMomentum {
    pub e: Energy,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    pub fn new(e: Energy, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Builds a four-momentum of the given energy and momentum magnitude pointing along
    /// (`cos_theta`, `phi`).
    pub fn from_direction(e: Energy, momentum: f64, cos_theta: f64, phi: f64) -> Self {
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        Self {
            e,
            px: momentum * sin_theta * phi.cos(),
            py: momentum * sin_theta * phi.sin(),
            pz: momentum * cos_theta,
        }
    }

    pub fn momentum(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Invariant mass, clamped at zero against rounding for massless particles.
    pub fn mass(&self) -> f64 {
        let p = self.momentum();
        ((self.e - p) * (self.e + p)).max(0.0).sqrt()
    }

    pub fn dot3(&self, other: &FourMomentum) -> f64 {
        self.px * other.px + self.py * other.py + self.pz * other.pz
    }

    /// Cosine of the angle to the beam axis. Zero for a particle at rest.
    pub fn cos_theta(&self) -> f64 {
        let p = self.momentum();
        if p > 0.0 { self.pz / p } else { 0.0 }
    }

    /// Cosine of the opening angle between two momenta. Zero if either is at rest.
    pub fn cos_angle_to(&self, other: &FourMomentum) -> f64 {
        let norm = self.momentum() * other.momentum();
        if norm > 0.0 {
            (self.dot3(other) / norm).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Transforms a momentum given in the rest frame of `parent` into the frame where
    /// the parent has four-momentum `parent`.
    ///
    /// `parent_mass` is passed explicitly rather than recomputed from `parent`, which
    /// would lose precision for highly boosted parents.
    pub fn boost_from_rest_frame_of(&self, parent: &FourMomentum, parent_mass: f64) -> Self {
        let p_dot_p = self.dot3(parent);
        let factor = p_dot_p / (parent_mass * (parent.e + parent_mass)) + self.e / parent_mass;
        Self {
            e: (self.e * parent.e + p_dot_p) / parent_mass,
            px: self.px + parent.px * factor,
            py: self.py + parent.py * factor,
            pz: self.pz + parent.pz * factor,
        }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

/// The heavy sterile neutrino at production.
///
/// Immutable once built; `new` guarantees `energy >= mass > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SterileNeutrino {
    mass: f64,
    energy: Energy,
    cos_theta: f64,
    phi: f64,
}

impl SterileNeutrino {
    pub fn new(mass: f64, energy: Energy, cos_theta: f64, phi: f64) -> Result<Self, KinematicError> {
        let finite = mass.is_finite() && energy.is_finite() && phi.is_finite();
        if !finite || mass <= 0.0 || energy < mass || !(-1.0..=1.0).contains(&cos_theta) {
            return Err(KinematicError::BelowMassShell { energy, mass });
        }
        Ok(Self {
            mass,
            energy,
            cos_theta,
            phi,
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn energy(&self) -> Energy {
        self.energy
    }

    pub fn cos_theta(&self) -> f64 {
        self.cos_theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn momentum(&self) -> f64 {
        ((self.energy - self.mass) * (self.energy + self.mass)).sqrt()
    }

    pub fn gamma(&self) -> f64 {
        self.energy / self.mass
    }

    pub fn beta(&self) -> f64 {
        self.momentum() / self.energy
    }

    pub fn four_momentum(&self) -> FourMomentum {
        FourMomentum::from_direction(self.energy, self.momentum(), self.cos_theta, self.phi)
    }
}

/// Momentum of either daughter in the rest frame of a parent of mass `parent`
/// decaying into daughters of masses `m1` and `m2`.
pub fn two_body_momentum(parent: f64, m1: f64, m2: f64) -> Result<f64, KinematicError> {
    let sum = m1 + m2;
    if parent < sum {
        return Err(KinematicError::KinematicallyClosed {
            parent,
            daughters: sum,
        });
    }
    let diff = m1 - m2;
    Ok(((parent - sum) * (parent + sum) * (parent - diff) * (parent + diff))
        .max(0.0)
        .sqrt()
        / (2.0 * parent))
}

/// Källén triangle function λ(a, b, c) = a² + b² + c² − 2ab − 2bc − 2ca.
pub fn kallen(a: f64, b: f64, c: f64) -> f64 {
    a * a + b * b + c * c - 2.0 * (a * b + b * c + c * a)
}

/// Draws a direction uniformly on the sphere as (cos θ, φ), consuming two flats in that order.
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let cos_theta = 2.0 * flat(rng) - 1.0;
    let phi = 2.0 * PI * flat(rng);
    (cos_theta, phi)
}

/// Decays `parent` (of rest mass `parent_mass`) isotropically into two daughters of
/// masses `m1`, `m2`, returning their lab-frame four-momenta. Consumes two flats.
pub fn isotropic_two_body<R: Rng + ?Sized>(
    rng: &mut R,
    parent: &FourMomentum,
    parent_mass: f64,
    m1: f64,
    m2: f64,
) -> Result<(FourMomentum, FourMomentum), KinematicError> {
    let p = two_body_momentum(parent_mass, m1, m2)?;
    let (cos_theta, phi) = isotropic_direction(rng);

    let first = FourMomentum::from_direction((p * p + m1 * m1).sqrt(), p, cos_theta, phi);
    let second = FourMomentum::new(
        (p * p + m2 * m2).sqrt(),
        -first.px,
        -first.py,
        -first.pz,
    );
    Ok((
        first.boost_from_rest_frame_of(parent, parent_mass),
        second.boost_from_rest_frame_of(parent, parent_mass),
    ))
}
