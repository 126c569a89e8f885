//! Binds a configured channel identifier to its kinematic model.
use crate::{
    channel::{ChannelId, ChannelModel, MediatorDecay, TwoBodyDecay},
    constants::{
        MASS_ELECTRON, MASS_MUON, MASS_PI0, MASS_PION, MEDIATOR_MASS, PDG_ELECTRON, PDG_GAMMA,
        PDG_MUON, PDG_NONE, PDG_PI0, PDG_PION, PdgCode,
    },
    error::ConfigError,
    settings::Settings,
};
use tracing::{error, info};

/// The ordered parameter vector configuring a channel model:
/// `[mass A or mediator mass, mass B or channel tag, channel tag, code A, code B]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters([f64; 5]);

impl ModelParameters {
    fn two_body(channel: ChannelId, mass_a: f64, mass_b: f64, codes: (PdgCode, PdgCode)) -> Self {
        Self([
            mass_a,
            mass_b,
            channel.tag() as f64,
            codes.0 as f64,
            codes.1 as f64,
        ])
    }

    fn mediator(channel: ChannelId, codes: (PdgCode, PdgCode)) -> Self {
        Self([
            MEDIATOR_MASS,
            channel.tag() as f64,
            channel.tag() as f64,
            codes.0 as f64,
            codes.1 as f64,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Daughter A mass for two-body channels, the mediator mass otherwise.
    pub fn mass_a(&self) -> f64 {
        let [mass_a, ..] = self.0;
        mass_a
    }

    /// Daughter B mass for two-body channels, the channel tag otherwise.
    pub fn mass_b(&self) -> f64 {
        let [_, mass_b, ..] = self.0;
        mass_b
    }

    pub fn channel_tag(&self) -> i32 {
        let [_, _, tag, ..] = self.0;
        tag as i32
    }

    pub fn daughter_codes(&self) -> (PdgCode, PdgCode) {
        let [.., code_a, code_b] = self.0;
        (code_a as PdgCode, code_b as PdgCode)
    }
}

/// Builds the model for `channel`.
///
/// # Error Modes
/// - [ConfigError::UnknownChannel] if `channel` is not on the menu.
/// - [ConfigError::BelowThreshold] if the configured sterile mass cannot decay via the channel at all.
pub fn build_channel(
    channel: i32,
    settings: &Settings,
) -> Result<(ChannelModel, ModelParameters), ConfigError> {
    let channel = ChannelId::try_from(channel).inspect_err(|e| error!("{e}"))?;

    let threshold = channel.threshold();
    if settings.sterile_mass <= threshold {
        return Err(ConfigError::BelowThreshold {
            channel: channel.to_string(),
            mass: settings.sterile_mass,
            threshold,
        });
    }

    let parameters = match channel {
        ChannelId::ElecPosi => ModelParameters::mediator(channel, (PDG_ELECTRON, -PDG_ELECTRON)),
        ChannelId::ElecPi => {
            ModelParameters::two_body(channel, MASS_ELECTRON, MASS_PION, (PDG_ELECTRON, PDG_PION))
        }
        ChannelId::MuonPi => {
            ModelParameters::two_body(channel, MASS_MUON, MASS_PION, (PDG_MUON, PDG_PION))
        }
        ChannelId::NuPi0 => ModelParameters::two_body(channel, 0.0, MASS_PI0, (PDG_PI0, PDG_NONE)),
        ChannelId::Gamma => ModelParameters::mediator(channel, (PDG_GAMMA, PDG_NONE)),
        ChannelId::MuMu => ModelParameters::mediator(channel, (PDG_MUON, -PDG_MUON)),
        ChannelId::MuE => ModelParameters::mediator(channel, (PDG_MUON, -PDG_ELECTRON)),
    };

    let model = match channel {
        ChannelId::ElecPi | ChannelId::MuonPi | ChannelId::NuPi0 => {
            ChannelModel::TwoBody(TwoBodyDecay::new(channel, parameters.clone()))
        }
        ChannelId::ElecPosi | ChannelId::Gamma | ChannelId::MuMu | ChannelId::MuE => {
            ChannelModel::Mediator(MediatorDecay::new(channel, parameters.clone()))
        }
    };
    info!(%channel, parameters = ?parameters.as_slice(), "Channel model built");
    Ok((model, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn daughter_codes_match_the_table() {
        let expected = [
            (ChannelId::ElecPosi, (11, -11)),
            (ChannelId::ElecPi, (11, 211)),
            (ChannelId::MuonPi, (13, 211)),
            (ChannelId::NuPi0, (111, 0)),
            (ChannelId::Gamma, (22, 0)),
            (ChannelId::MuMu, (13, -13)),
            (ChannelId::MuE, (13, -11)),
        ];
        for (channel, codes) in expected {
            let (model, parameters) =
                build_channel(channel.tag(), &Settings::for_channel(channel, 0.5)).unwrap();
            assert_eq!(model.id(), channel);
            assert_eq!(parameters.daughter_codes(), codes, "{channel}");
            assert_eq!(model.parameters(), &parameters);
            assert_eq!(parameters.channel_tag(), channel.tag());
            assert_eq!(parameters.as_slice().len(), 5);
        }
    }

    #[test]
    fn parameter_vectors() {
        let settings = Settings::for_channel(ChannelId::ElecPi, 0.5);
        let (_, parameters) = build_channel(ChannelId::ElecPi.tag(), &settings).unwrap();
        assert_eq!(
            parameters.as_slice(),
            &[MASS_ELECTRON, MASS_PION, 2.0, 11.0, 211.0]
        );

        let (_, parameters) = build_channel(ChannelId::NuPi0.tag(), &settings).unwrap();
        assert_eq!(parameters.as_slice(), &[0.0, MASS_PI0, 4.0, 111.0, 0.0]);

        let (_, parameters) = build_channel(ChannelId::Gamma.tag(), &settings).unwrap();
        assert_eq!(parameters.as_slice(), &[91.19, 6.0, 6.0, 22.0, 0.0]);
    }

    #[test]
    fn variants_by_channel() {
        for channel in ChannelId::iter() {
            let (model, _) =
                build_channel(channel.tag(), &Settings::for_channel(channel, 0.5)).unwrap();
            let two_body = matches!(model, ChannelModel::TwoBody(_));
            assert_eq!(
                two_body,
                matches!(
                    channel,
                    ChannelId::ElecPi | ChannelId::MuonPi | ChannelId::NuPi0
                ),
                "{channel}"
            );
        }
    }

    #[test]
    fn mue_ignores_run_settings() {
        for mass in [0.2, 0.35, 1.5] {
            let mut settings = Settings::for_channel(ChannelId::MuE, mass);
            settings.distance = 100.0 * mass;
            settings.beam_window = 10.0;
            let (model, parameters) = build_channel(ChannelId::MuE.tag(), &settings).unwrap();
            assert_eq!(parameters.daughter_codes(), (PDG_MUON, -PDG_ELECTRON));
            assert_eq!(
                model.id().decay_path(),
                crate::channel::DecayPath::ExplicitMasses {
                    mass_a: MASS_MUON,
                    mass_b: MASS_ELECTRON,
                    aux: 0.0
                }
            );
        }
    }

    #[test]
    fn unknown_channel_builds_nothing() {
        let settings = Settings::for_channel(ChannelId::MuMu, 0.5);
        for bad in [7, 42, -3, i32::MAX] {
            let error = build_channel(bad, &settings).unwrap_err();
            assert!(matches!(error, ConfigError::UnknownChannel(id) if id == bad));
            assert!(error.to_string().contains(&bad.to_string()));
        }
    }

    #[test]
    fn closed_channel_is_a_configuration_error() {
        let settings = Settings::for_channel(ChannelId::NuPi0, 0.02);
        assert!(matches!(
            build_channel(ChannelId::NuPi0.tag(), &settings),
            Err(ConfigError::BelowThreshold { .. })
        ));
    }
}
