use super::{ChannelId, Daughter, DecayProduct, DecayProducts};
use crate::{
    constants::{PDG_GAMMA, PDG_NONE},
    error::KinematicError,
    factory::ModelParameters,
    kinematics::{SterileNeutrino, isotropic_two_body, kallen},
    random::flat,
};
use rand::Rng;
use tracing::trace;

/// Accept-reject attempts allowed when sampling the pair invariant mass.
pub const MAX_SAMPLING_ATTEMPTS: usize = 1000;

/// Grid points used to find the envelope of the pair-mass density.
const ENVELOPE_POINTS: usize = 128;

/// Headroom over the sampled grid maximum, covering the peak falling between grid points.
const ENVELOPE_MARGIN: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediatorFinalState {
    /// N → ν ℓ_a ℓ_b
    LeptonPair([Daughter; 2]),
    /// N → γ ν
    Photon,
}

/// Decays proceeding through a heavy neutral mediator.
#[derive(Debug, Clone, PartialEq)]
pub struct MediatorDecay {
    channel: ChannelId,
    mediator_mass: f64,
    final_state: MediatorFinalState,
    parameters: ModelParameters,
}

impl MediatorDecay {
    pub(crate) fn new(channel: ChannelId, parameters: ModelParameters) -> Self {
        let (code_a, code_b) = parameters.daughter_codes();
        let final_state = if code_a == PDG_GAMMA {
            MediatorFinalState::Photon
        } else {
            MediatorFinalState::LeptonPair([Daughter::from_code(code_a), Daughter::from_code(code_b)])
        };
        Self {
            channel,
            mediator_mass: parameters.mass_a(),
            final_state,
            parameters,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn mediator_mass(&self) -> f64 {
        self.mediator_mass
    }

    pub fn final_state(&self) -> &MediatorFinalState {
        &self.final_state
    }

    pub(crate) fn decay<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        match self.final_state {
            MediatorFinalState::LeptonPair([a, b]) => {
                self.lepton_pair(parent, [a, b], 0.0, rng)
            }
            MediatorFinalState::Photon => self.photon(parent, 0.0, 0.0, rng),
        }
    }

    /// `width` is the mediator width entering the propagator.
    pub(crate) fn decay_with_masses<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        mass_a: f64,
        mass_b: f64,
        width: f64,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        match self.final_state {
            MediatorFinalState::LeptonPair([a, b]) => self.lepton_pair(
                parent,
                [
                    Daughter {
                        pdg: a.pdg,
                        mass: mass_a,
                    },
                    Daughter {
                        pdg: b.pdg,
                        mass: mass_b,
                    },
                ],
                width,
                rng,
            ),
            MediatorFinalState::Photon => self.photon(parent, mass_a, mass_b, rng),
        }
    }

    fn photon<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        mass_gamma: f64,
        mass_nu: f64,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        let (gamma, nu) = isotropic_two_body(
            rng,
            &parent.four_momentum(),
            parent.mass(),
            mass_gamma,
            mass_nu,
        )?;
        Ok(DecayProducts {
            channel: self.channel,
            products: vec![
                DecayProduct {
                    pdg: PDG_GAMMA,
                    momentum: gamma,
                },
                DecayProduct {
                    pdg: PDG_NONE,
                    momentum: nu,
                },
            ],
        })
    }

    /// Unnormalised density of the pair invariant mass squared `s`: three-body phase
    /// space with a massless neutrino, times the mediator propagator.
    fn pair_mass_density(&self, parent_mass: f64, s: f64, [a, b]: [Daughter; 2], width: f64) -> f64 {
        if s <= 0.0 {
            return 0.0;
        }
        let phase_space = kallen(parent_mass * parent_mass, s, 0.0).max(0.0).sqrt()
            * kallen(s, a.mass * a.mass, b.mass * b.mass).max(0.0).sqrt()
            / s;
        let m2 = self.mediator_mass * self.mediator_mass;
        let propagator = m2 * m2 / ((s - m2).powi(2) + m2 * width * width);
        phase_space * propagator
    }

    /// Samples N → ν (ℓ_a ℓ_b).
    ///
    /// Each attempt draws the pair mass squared and an acceptance flat. Once accepted,
    /// N → ν X and X → ℓ_a ℓ_b are decayed isotropically, four more flats.
    fn lepton_pair<R: Rng + ?Sized>(
        &self,
        parent: &SterileNeutrino,
        daughters: [Daughter; 2],
        width: f64,
        rng: &mut R,
    ) -> Result<DecayProducts, KinematicError> {
        let [a, b] = daughters;
        let parent_mass = parent.mass();
        let pair_threshold = a.mass + b.mass;
        if parent_mass <= pair_threshold {
            return Err(KinematicError::KinematicallyClosed {
                parent: parent_mass,
                daughters: pair_threshold,
            });
        }

        let s_min = pair_threshold * pair_threshold;
        let s_range = parent_mass * parent_mass - s_min;
        let envelope = ENVELOPE_MARGIN
            * (0..=ENVELOPE_POINTS)
                .map(|i| {
                    let s = s_min + s_range * i as f64 / ENVELOPE_POINTS as f64;
                    self.pair_mass_density(parent_mass, s, daughters, width)
                })
                .fold(0.0, f64::max);

        for attempt in 1..=MAX_SAMPLING_ATTEMPTS {
            let s = s_min + s_range * flat(rng);
            let threshold = flat(rng) * envelope;
            let density = self.pair_mass_density(parent_mass, s, daughters, width);
            if density <= 0.0 || threshold > density {
                continue;
            }

            let pair_mass = s.sqrt().max(pair_threshold);
            let (nu, pair) =
                isotropic_two_body(rng, &parent.four_momentum(), parent_mass, 0.0, pair_mass)?;
            let (lepton_a, lepton_b) = isotropic_two_body(rng, &pair, pair_mass, a.mass, b.mass)?;
            trace!(channel = %self.channel, attempt, pair_mass, "Lepton pair accepted");

            return Ok(DecayProducts {
                channel: self.channel,
                products: vec![
                    DecayProduct {
                        pdg: PDG_NONE,
                        momentum: nu,
                    },
                    DecayProduct {
                        pdg: a.pdg,
                        momentum: lepton_a,
                    },
                    DecayProduct {
                        pdg: b.pdg,
                        momentum: lepton_b,
                    },
                ],
            });
        }
        Err(KinematicError::SamplingExhausted(MAX_SAMPLING_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::ChannelModel,
        constants::{MASS_ELECTRON, MASS_MUON, MEDIATOR_MASS, PDG_ELECTRON, PDG_MUON},
        factory::build_channel,
        random::mock::{ConstantRng, SequenceRng},
        settings::Settings,
    };
    use assert_approx_eq::assert_approx_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn model(channel: ChannelId, mass: f64) -> MediatorDecay {
        let settings = Settings::for_channel(channel, mass);
        match build_channel(channel.tag(), &settings).unwrap().0 {
            ChannelModel::Mediator(model) => model,
            other => panic!("unexpected model {other:?}"),
        }
    }

    #[test]
    fn final_states_follow_the_codes() {
        let elecposi = model(ChannelId::ElecPosi, 0.3);
        assert_eq!(elecposi.mediator_mass(), MEDIATOR_MASS);
        assert_eq!(
            elecposi.final_state(),
            &MediatorFinalState::LeptonPair([
                Daughter {
                    pdg: PDG_ELECTRON,
                    mass: MASS_ELECTRON
                },
                Daughter {
                    pdg: -PDG_ELECTRON,
                    mass: MASS_ELECTRON
                },
            ])
        );
        assert_eq!(
            model(ChannelId::Gamma, 0.3).final_state(),
            &MediatorFinalState::Photon
        );
    }

    #[test]
    fn lepton_pairs_conserve_four_momentum() {
        let model = model(ChannelId::MuMu, 0.4);
        let parent = SterileNeutrino::new(0.4, 1.9, 0.99999, 0.8).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let products = model
                .decay_with_masses(&parent, MASS_MUON, MASS_MUON, 0.0, &mut rng)
                .unwrap();
            assert_eq!(products.products.len(), 3);
            let total = products.total_momentum();
            assert_approx_eq!(total.e, 1.9, 1e-9);
            assert_approx_eq!(total.pz, parent.four_momentum().pz, 1e-9);
            assert_approx_eq!(total.mass(), 0.4, 1e-6);

            let pair = products.products[1].momentum + products.products[2].momentum;
            assert!(pair.mass() >= 2.0 * MASS_MUON - 1e-9);
            assert_approx_eq!(products.products[1].momentum.mass(), MASS_MUON, 1e-6);
        }
    }

    #[test]
    fn explicit_masses_override_bound_masses() {
        let model = model(ChannelId::MuE, 0.3);
        let parent = SterileNeutrino::new(0.3, 1.0, 0.99999, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let products = model
            .decay_with_masses(&parent, MASS_MUON, MASS_ELECTRON, 0.0, &mut rng)
            .unwrap();
        assert_eq!(products.products[1].pdg, PDG_MUON);
        assert_eq!(products.products[2].pdg, -PDG_ELECTRON);
        assert_approx_eq!(products.products[1].momentum.mass(), MASS_MUON, 1e-6);
        assert_approx_eq!(products.products[2].momentum.mass(), MASS_ELECTRON, 1e-5);
    }

    #[test]
    fn pair_below_threshold_is_closed() {
        let model = model(ChannelId::MuMu, 0.4);
        let parent = SterileNeutrino::new(0.15, 1.0, 0.99999, 0.0).unwrap();
        assert_eq!(
            model.decay_with_masses(&parent, MASS_MUON, MASS_MUON, 0.0, &mut ConstantRng::new(0.5)),
            Err(KinematicError::KinematicallyClosed {
                parent: 0.15,
                daughters: 2.0 * MASS_MUON
            })
        );
    }

    #[test]
    fn rejection_loop_is_bounded() {
        // Always proposing the end point s = M², where the density vanishes.
        let model = model(ChannelId::ElecPosi, 0.3);
        let parent = SterileNeutrino::new(0.3, 1.0, 0.99999, 0.0).unwrap();
        let mut rng = SequenceRng::new(&[1.0 - f64::EPSILON]);
        assert_eq!(
            model.decay(&parent, &mut rng),
            Err(KinematicError::SamplingExhausted(MAX_SAMPLING_ATTEMPTS))
        );
        assert_eq!(rng.draws, 2 * MAX_SAMPLING_ATTEMPTS);
    }

    #[test]
    fn photon_decay_shares_the_mass_equally() {
        let model = model(ChannelId::Gamma, 0.3);
        let parent = SterileNeutrino::new(0.3, 0.3, 1.0, 0.0).unwrap();
        let products = model.decay(&parent, &mut ConstantRng::new(0.5)).unwrap();
        assert_eq!(products.products[0].pdg, PDG_GAMMA);
        assert_approx_eq!(products.products[0].momentum.e, 0.15, 1e-12);
        assert_approx_eq!(products.products[1].momentum.e, 0.15, 1e-12);
    }
}
