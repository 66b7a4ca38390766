//! Types and helpers shared by the pulsar profile crates.
pub mod tracer;

pub use tracer::{TracerError, init_tracer};

/// Observation time, in the units of the phase model (usually seconds).
pub type Time = f64;

/// Pulse phase, measured in turns. One period spans a unit interval.
pub type Phase = f64;

/// Flux density, in units of the profile's peak amplitude.
pub type Flux = f64;
