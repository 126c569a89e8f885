pub mod metrics;
pub mod tracer;

/// Energies and masses are in GeV throughout the generator.
pub type Energy = f64;

/// Lengths inside the detector are in centimetres.
pub type Length = f64;

/// Event times are in nanoseconds.
pub type Nanoseconds = f64;
