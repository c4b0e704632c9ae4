//! emission — from tag profiles to emission likelihood maps.
//!
//! Purpose
//! -------
//! Prepare the per-step likelihood maps consumed by the HMM filters. A tag
//! records a profile (e.g. temperature at several depths) per observation;
//! each grid cell has a reference column. The pipeline is:
//!
//! 1. [`profile`]: nearest-depth residual per cell ([`residual_field`]) or per
//!    time step ([`residual_sequence`]).
//! 2. [`likelihood`]: residuals → Normal(0, std) densities, assembled into an
//!    `EmissionSequence` ([`emission_sequence`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Undefined statistics are NaN, never errors. A NaN cell has zero
//!   likelihood; an all-NaN step is non-informative (all ones).
//! - Residual routines are generic over `num_traits::Float`; likelihood maps
//!   are always `f64`.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover the match rule, the depth gate,
//!   NaN handling and the likelihood mapping.

pub mod errors;
pub mod likelihood;
pub mod profile;

pub use self::errors::{EmissionError, EmissionResult};
pub use self::likelihood::{emission_sequence, residual_likelihood};
pub use self::profile::{
    DEFAULT_DEPTH_THRESHOLD, ReferenceField, TagProfile, profile_residual, residual_field,
    residual_sequence,
};
