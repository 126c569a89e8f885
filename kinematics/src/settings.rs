use crate::{channel::ChannelId, error::ConfigError};
use hnl_common::Nanoseconds;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::info;

///
/// The run configuration, read once from a JSON file and never modified.
///
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Integer tag of the decay channel, see [ChannelId].
    pub decay_channel: i32,
    /// Sterile neutrino mass in GeV.
    pub sterile_mass: f64,
    /// Source-to-detector distance in metres.
    pub distance: f64,
    #[serde(default)]
    pub global_time_offset: Nanoseconds,
    /// Width of the beam spill.
    #[serde(default)]
    pub beam_window: Nanoseconds,
}

impl Settings {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_reader(reader)?;
        settings.validate()?;
        info!(
            channel = settings.decay_channel,
            sterile_mass = settings.sterile_mass,
            distance = settings.distance,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Checks the numeric ranges of every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("sterile-mass", self.sterile_mass, self.sterile_mass > 0.0),
            ("distance", self.distance, self.distance > 0.0),
            ("beam-window", self.beam_window, self.beam_window >= 0.0),
            ("global-time-offset", self.global_time_offset, true),
        ];
        for (name, value, in_range) in checks {
            if !(in_range && value.is_finite()) {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }

    pub fn channel(&self) -> Result<ChannelId, ConfigError> {
        ChannelId::try_from(self.decay_channel)
    }

    #[cfg(test)]
    pub(crate) fn for_channel(channel: ChannelId, sterile_mass: f64) -> Self {
        Self {
            decay_channel: channel.tag(),
            sterile_mass,
            distance: 500.0,
            global_time_offset: 0.0,
            beam_window: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_INPUT_1: &str = r#"
    {
        "decay-channel": 3,
        "sterile-mass": 0.3,
        "distance": 470.0,
        "global-time-offset": 3125.0,
        "beam-window": 1600.0
    }
    "#;

    #[test]
    fn read_settings() {
        let settings = Settings::from_reader(JSON_INPUT_1.as_bytes()).unwrap();
        assert_eq!(settings.channel().unwrap(), ChannelId::MuonPi);
        assert_eq!(settings.sterile_mass, 0.3);
        assert_eq!(settings.distance, 470.0);
        assert_eq!(settings.global_time_offset, 3125.0);
        assert_eq!(settings.beam_window, 1600.0);
    }

    #[test]
    fn timing_fields_default_to_zero() {
        let settings = Settings::from_reader(
            r#"{ "decay-channel": 6, "sterile-mass": 0.1, "distance": 100 }"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(settings.global_time_offset, 0.0);
        assert_eq!(settings.beam_window, 0.0);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let mut settings = Settings::for_channel(ChannelId::MuMu, 0.5);
        settings.sterile_mass = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting {
                name: "sterile-mass",
                ..
            })
        ));

        let mut settings = Settings::for_channel(ChannelId::MuMu, 0.5);
        settings.beam_window = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::for_channel(ChannelId::MuMu, 0.5);
        settings.global_time_offset = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_channel_is_reported_on_lookup() {
        let settings = Settings::from_reader(
            r#"{ "decay-channel": 12, "sterile-mass": 0.1, "distance": 100 }"#.as_bytes(),
        )
        .unwrap();
        assert!(matches!(
            settings.channel(),
            Err(ConfigError::UnknownChannel(12))
        ));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk unplugged"))
        }
    }

    #[test]
    fn reader_failure_is_a_config_error() {
        let error = Settings::from_reader(FailingReader).unwrap_err();
        assert!(matches!(&error, ConfigError::Json(e) if e.is_io()));
        assert!(error.to_string().contains("disk unplugged"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            Settings::from_reader(r#"{ "decay-channel": "x" }"#.as_bytes()),
            Err(ConfigError::Json(_))
        ));
    }
}
