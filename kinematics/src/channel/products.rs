use super::ChannelId;
use crate::{
    constants::{PdgCode, charge_conjugate, is_invisible},
    kinematics::FourMomentum,
    observables::Observables,
    random::flat,
};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayProduct {
    pub pdg: PdgCode,
    pub momentum: FourMomentum,
}

impl DecayProduct {
    fn conjugated(self) -> Self {
        Self {
            pdg: charge_conjugate(self.pdg),
            ..self
        }
    }
}

/// The lab-frame final state of one decay.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayProducts {
    pub channel: ChannelId,
    pub products: Vec<DecayProduct>,
}

impl DecayProducts {
    pub fn total_momentum(&self) -> FourMomentum {
        self.products
            .iter()
            .fold(FourMomentum::default(), |sum, product| sum + product.momentum)
    }

    /// Writes the decay-product fields of `observables`.
    ///
    /// Consumes one flat: a Majorana sterile neutrino decays to either charge-conjugate
    /// final state with equal probability, and all codes are conjugated when it is below 0.5.
    pub fn fill_observables<R: Rng + ?Sized>(&self, observables: &mut Observables, rng: &mut R) {
        let conjugate = flat(rng) < 0.5;

        let mut visible = self
            .products
            .iter()
            .filter(|product| !is_invisible(product.pdg))
            .map(|&product| {
                if conjugate {
                    product.conjugated()
                } else {
                    product
                }
            })
            .collect::<Vec<_>>();
        visible.sort_by(|a, b| b.momentum.e.total_cmp(&a.momentum.e));

        let sum = visible
            .iter()
            .fold(FourMomentum::default(), |sum, product| sum + product.momentum);

        observables.channel = Some(self.channel);
        observables.e_sum = sum.e;
        observables.cos_theta_sum = sum.cos_theta();
        observables.invariant_mass = sum.mass();

        let (high, low) = match visible.as_slice() {
            [high, low, ..] => (Some(high), Some(low)),
            [high] => (Some(high), None),
            [] => (None, None),
        };
        observables.cos_opening_angle = match (high, low) {
            (Some(high), Some(low)) => high.momentum.cos_angle_to(&low.momentum),
            _ => 0.0,
        };
        (observables.e_high, observables.cos_theta_high, observables.pdg_high) =
            product_fields(high);
        (observables.e_low, observables.cos_theta_low, observables.pdg_low) = product_fields(low);
    }
}

fn product_fields(product: Option<&DecayProduct>) -> (f64, f64, PdgCode) {
    product
        .map(|p| (p.momentum.e, p.momentum.cos_theta(), p.pdg))
        .unwrap_or_default()
}
