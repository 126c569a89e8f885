use metrics::{describe_counter, describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    describe_gauge!(names::COMPONENT_INFO, "Basic information about the component");

    let git_rev = option_env!("GIT_VERSION").unwrap_or("unknown");
    gauge!(names::COMPONENT_INFO, "component" => name, "git_version" => git_rev).set(1.0);
}

/// Registers descriptions for every counter the generator emits.
pub fn describe_event_metrics() {
    describe_counter!(
        names::EVENTS_GENERATED,
        metrics::Unit::Count,
        "Events successfully generated"
    );
    describe_counter!(
        names::EVENTS_REJECTED,
        metrics::Unit::Count,
        "Event attempts rejected and resampled, by kind"
    );
    describe_counter!(
        names::EVENTS_FAILED,
        metrics::Unit::Count,
        "Events abandoned after exhausting their attempts"
    );
}

pub mod names {
    use const_format::concatcp;

    pub const METRIC_NAME_PREFIX: &str = "hnl_generator_";

    pub const COMPONENT_INFO: &str = concatcp!(METRIC_NAME_PREFIX, "component_info");
    pub const EVENTS_GENERATED: &str = concatcp!(METRIC_NAME_PREFIX, "events_generated");
    pub const EVENTS_REJECTED: &str = concatcp!(METRIC_NAME_PREFIX, "events_rejected");
    pub const EVENTS_FAILED: &str = concatcp!(METRIC_NAME_PREFIX, "events_failed");
}

pub mod rejections {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum RejectionKind {
        BelowMassShell,
        KinematicallyClosed,
        SamplingExhausted,
    }

    // Label building function
    pub fn get_label(kind: RejectionKind) -> (&'static str, &'static str) {
        (
            "rejection_kind",
            match kind {
                RejectionKind::BelowMassShell => "below_mass_shell",
                RejectionKind::KinematicallyClosed => "kinematically_closed",
                RejectionKind::SamplingExhausted => "sampling_exhausted",
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_built_from_the_prefix() {
        assert_eq!(names::EVENTS_GENERATED, "hnl_generator_events_generated");
        assert_eq!(names::EVENTS_REJECTED, "hnl_generator_events_rejected");
        assert_eq!(names::EVENTS_FAILED, "hnl_generator_events_failed");
        assert_eq!(names::COMPONENT_INFO, "hnl_generator_component_info");
        for name in [
            names::COMPONENT_INFO,
            names::EVENTS_GENERATED,
            names::EVENTS_REJECTED,
            names::EVENTS_FAILED,
        ] {
            assert!(name.starts_with(names::METRIC_NAME_PREFIX));
        }
    }

    #[test]
    fn rejection_labels_are_distinct() {
        let labels = [
            rejections::get_label(rejections::RejectionKind::BelowMassShell),
            rejections::get_label(rejections::RejectionKind::KinematicallyClosed),
            rejections::get_label(rejections::RejectionKind::SamplingExhausted),
        ];
        assert!(labels.iter().all(|(key, _)| *key == "rejection_kind"));
        assert_ne!(labels[0].1, labels[1].1);
        assert_ne!(labels[1].1, labels[2].1);
    }
}
