//! # Pulsar Profile
//!
//! Simulates the flux received from a pulsar in a regularly spaced sequence of time samples.
//!
//! Two ingredients are needed:
//! * a pulse profile, [VonMisesProfile], which gives the flux as a function of pulse phase;
//! * a phase model, anything implementing [PhaseModel], which gives the pulse phase as a
//!   monotonically increasing function of time.
//!
//! The profile is precomputed on a uniform phase grid together with its running antiderivative,
//! so that the average flux over any time sample costs O(1) regardless of how many pulse periods
//! the sample spans.
//!
//! ```rust
//! use pulsar_profile::{ConstantAccelerationPhaseModel, VonMisesProfile};
//!
//! let profile = VonMisesProfile::new(0.1, false, 0)?;
//! let phase_model = ConstantAccelerationPhaseModel::new(0.0, 1.3, 0.0, 0.0)?;
//! let mut samples = vec![0.0; 1000];
//! profile.eval_integrated_samples(&mut samples, 0.0, 10.0, &phase_model, 1.0)?;
//! # Ok::<(), pulsar_profile::ProfileError>(())
//! ```
mod error;
mod parameters;
mod phase_model;
mod profile;

pub use error::{ArgumentError, ConfigurationError, ProfileError};
pub use parameters::ProfileConfig;
pub use phase_model::{ConstantAccelerationPhaseModel, PhaseModel};
pub use profile::{
    DEFAULT_BLOCK_SIZE, MAX_GRID_RESOLUTION, MIN_GRID_RESOLUTION, SampleBuffer, VonMisesProfile,
};
pub use pulsar_common::{Flux, Phase, Time};
