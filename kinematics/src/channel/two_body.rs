use super::{ChannelId, Daughter, DecayProduct, DecayProducts};
use crate::{
    error::KinematicError,
    factory::ModelParameters,
    kinematics::{SterileNeutrino, isotropic_two_body},
};
use rand::Rng;
use tracing::trace;

/// N → a + b with both daughter masses fixed by the channel.
///
/// The decay is isotropic in the sterile rest frame and consumes two flats.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoBodyDecay {
    channel: ChannelId,
    daughters: [Daughter; 2],
    parameters: ModelParameters,
}

impl TwoBodyDecay {
    /// Daughter masses are read from the parameter slots. NUPI0 lists the neutrino
    /// mass first, the reverse of its code order (π0, ν).
    pub(crate) fn new(channel: ChannelId, parameters: ModelParameters) -> Self {
        let (code_a, code_b) = parameters.daughter_codes();
        let (mass_a, mass_b) = match channel {
            ChannelId::NuPi0 => (parameters.mass_b(), parameters.mass_a()),
            _ => (parameters.mass_a(), parameters.mass_b()),
        };
        Self {
            channel,
            daughters: [
                Daughter {
                    pdg: code_a,
                    mass: mass_a,
                },
                Daughter {
                    pdg: code_b,
                    mass: mass_b,
                },
            ],
            parameters,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn daughters(&self) -> &[Daughter; 2] {
        &self.daughters
    }

    pub(crate) fn decay<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        let [a, b] = self.daughters;
        self.decay_with_masses(parent, a.mass, b.mass, rng)
    }

    pub(crate) fn decay_with_masses<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        mass_a: f64,
        mass_b: f64,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        let [a, b] = self.daughters;
        let (momentum_a, momentum_b) = isotropic_two_body(
            rng,
            &parent.four_momentum(),
            parent.mass(),
            mass_a,
            mass_b,
        )?;
        trace!(channel = %self.channel, e_a = momentum_a.e, e_b = momentum_b.e, "Two body decay");
        Ok(DecayProducts {
            channel: self.channel,
            products: vec![
                DecayProduct {
                    pdg: a.pdg,
                    momentum: momentum_a,
                },
                DecayProduct {
                    pdg: b.pdg,
                    momentum: momentum_b,
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{
            MASS_MUON, MASS_PI0, MASS_PION, PDG_MUON, PDG_NONE, PDG_PI0, PDG_PION, rest_mass,
        },
        factory::build_channel,
        random::mock::ConstantRng,
        settings::Settings,
    };
    use assert_approx_eq::assert_approx_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn model(channel: ChannelId, mass: f64) -> TwoBodyDecay {
        let settings = Settings::for_channel(channel, mass);
        match build_channel(channel.tag(), &settings).unwrap().0 {
            super::super::ChannelModel::TwoBody(model) => model,
            other => panic!("unexpected model {other:?}"),
        }
    }

    #[test]
    fn daughters_follow_the_codes() {
        let model = model(ChannelId::MuonPi, 0.3);
        assert_eq!(model.daughters()[0].pdg, PDG_MUON);
        assert_eq!(model.daughters()[0].mass, MASS_MUON);
        assert_eq!(model.daughters()[1].pdg, PDG_PION);
        assert_eq!(model.daughters()[1].mass, MASS_PION);

        let model = model_nupi0();
        assert_eq!(model.daughters()[0].pdg, PDG_PI0);
        assert_eq!(model.daughters()[0].mass, MASS_PI0);
        assert_eq!(model.daughters()[1].pdg, PDG_NONE);
        assert_eq!(model.daughters()[1].mass, 0.0);
    }

    #[test]
    fn parameter_masses_agree_with_the_codes() {
        for (channel, mass) in [
            (ChannelId::ElecPi, 0.3),
            (ChannelId::MuonPi, 0.3),
            (ChannelId::NuPi0, 0.2),
        ] {
            let model = model(channel, mass);
            for daughter in model.daughters() {
                assert_eq!(daughter.mass, rest_mass(daughter.pdg), "{channel}");
            }
            let [a, b] = model.daughters();
            let parameters = model.parameters();
            let mut bound = [parameters.mass_a(), parameters.mass_b()];
            let mut used = [a.mass, b.mass];
            bound.sort_by(f64::total_cmp);
            used.sort_by(f64::total_cmp);
            assert_eq!(bound, used, "{channel}");
        }
    }

    fn model_nupi0() -> TwoBodyDecay {
        model(ChannelId::NuPi0, 0.2)
    }

    #[test]
    fn rest_frame_energies_are_fixed() {
        // For a parent nearly at rest, daughter energies are the rest-frame values.
        let model = model_nupi0();
        let parent = SterileNeutrino::new(0.2, 0.2 * (1.0 + 1e-12), 1.0, 0.0).unwrap();
        let products = model.decay(&parent, &mut ConstantRng::new(0.5)).unwrap();

        let expected_pi0 = (0.2 * 0.2 + MASS_PI0 * MASS_PI0) / (2.0 * 0.2);
        assert_approx_eq!(products.products[0].momentum.e, expected_pi0, 1e-6);
        assert_approx_eq!(products.products[1].momentum.e, 0.2 - expected_pi0, 1e-6);
    }

    #[test]
    fn decay_consumes_two_flats_and_conserves_energy() {
        let model = model(ChannelId::ElecPi, 0.35);
        let parent = SterileNeutrino::new(0.35, 1.7, 0.99999, 1.1).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let products = model.decay(&parent, &mut rng).unwrap();
            assert_eq!(products.products.len(), 2);
            let total = products.total_momentum();
            assert_approx_eq!(total.e, 1.7, 1e-9);
            assert_approx_eq!(total.mass(), 0.35, 1e-6);
        }

        let mut seq = crate::random::mock::SequenceRng::new(&[0.3, 0.6]);
        model.decay(&parent, &mut seq).unwrap();
        assert_eq!(seq.draws, 2);
    }

    #[test]
    fn closed_channel_is_an_error() {
        let model = model_nupi0();
        let light = SterileNeutrino::new(0.1, 1.0, 0.99999, 0.0).unwrap();
        assert!(matches!(
            model.decay(&light, &mut ConstantRng::new(0.5)),
            Err(KinematicError::KinematicallyClosed { .. })
        ));
    }
}
