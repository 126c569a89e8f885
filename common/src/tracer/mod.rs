mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerOptions};

/// Should be called once, at the start of each binary.
/// The argument is the `LevelFilter` applied to stdout when `RUST_LOG` is not set.
#[macro_export]
macro_rules! init_tracer {
    ($level:expr) => {{
        $crate::tracer::TracerEngine::new(
            $crate::tracer::TracerOptions {
                default_level: $level,
            },
            env!("CARGO_BIN_NAME"),
        )
    }};
}
