//! Filter options — configuration shared by every filter run.
//!
//! Purpose
//! -------
//! Collect the knobs that are not model parameters but still change the
//! numerical result of a run, so call sites pass one explicit, validated value
//! instead of ad-hoc flags.
//!
//! Key behaviors
//! -------------
//! - [`TimeScaling`] maps an elapsed time `Δt` to the factor applied to
//!   `sigma` when building the diffusion kernel for that interval.
//! - [`FilterOptions`] bundles the time scaling; it is `Copy` and cheap to
//!   carry inside an estimator.
//!
//! Conventions
//! -----------
//! - `TimeScaling` parses case-insensitively from `"brownian"` / `"ballistic"`
//!   so bindings can accept plain strings.
use crate::hmm::errors::{HMMError, HMMResult};
use std::str::FromStr;

/// How the kernel's standard deviation grows with the elapsed time.
///
/// - `Brownian`: `sigma * sqrt(Δt)` (random-walk diffusion, default).
/// - `Ballistic`: `sigma * Δt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeScaling {
    #[default]
    Brownian,
    Ballistic,
}

impl TimeScaling {
    /// Factor `f(Δt)` such that the kernel spread is `sigma * f(Δt)`.
    pub fn factor(&self, dt: f64) -> f64 {
        match self {
            TimeScaling::Brownian => dt.sqrt(),
            TimeScaling::Ballistic => dt,
        }
    }
}

impl FromStr for TimeScaling {
    type Err = HMMError;

    /// Parse `"brownian"` / `"ballistic"` (any case).
    ///
    /// Any other value returns `HMMError::InvalidTimeScaling`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "brownian" => Ok(TimeScaling::Brownian),
            "ballistic" => Ok(TimeScaling::Ballistic),
            _ => Err(HMMError::InvalidTimeScaling { name: s.to_string() }),
        }
    }
}

/// `FilterOptions` — run-time configuration for the filters.
///
/// Fields
/// ------
/// - `time_scaling`: [`TimeScaling`] used for every inter-observation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterOptions {
    pub time_scaling: TimeScaling,
}

impl FilterOptions {
    pub fn new(time_scaling: TimeScaling) -> Self {
        FilterOptions { time_scaling }
    }

    /// Build options from an optional string, defaulting to Brownian scaling.
    ///
    /// # Errors
    /// - `HMMError::InvalidTimeScaling` for an unknown name.
    pub fn from_name(time_scaling: Option<&str>) -> HMMResult<Self> {
        let time_scaling = match time_scaling {
            Some(name) => TimeScaling::from_str(name)?,
            None => TimeScaling::default(),
        };
        Ok(FilterOptions { time_scaling })
    }
}

impl From<TimeScaling> for FilterOptions {
    fn from(time_scaling: TimeScaling) -> Self {
        FilterOptions::new(time_scaling)
    }
}
