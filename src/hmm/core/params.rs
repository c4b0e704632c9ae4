//! Model parameters for the Gaussian random-walk HMM.
//!
//! `sigma` is the standard deviation of the distance travelled per time unit,
//! in the same unit as the grid spacing; `truncate` is the kernel cut-off in
//! standard deviations (together they bound the distance the animal can cover
//! between two observations). `truncate == 0` disables truncation, in which case
//! the kernel is cut at [`MAX_CUTOFF_STD_DEVS`].
//!
//! Parameters are plain immutable values: every "setter" returns a new
//! [`ModelParams`], so concurrent scoring sweeps never observe a parameter
//! change mid-run.
use crate::hmm::{
    core::validation::{validate_sigma, validate_truncate},
    errors::HMMResult,
};

/// Default kernel cut-off, in standard deviations.
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Largest cut-off, in standard deviations, of any kernel. Taps past it are
/// below `e^{-50}` of the peak.
pub const MAX_CUTOFF_STD_DEVS: f64 = 10.0;

/// `ModelParams` — `(sigma, truncate)`.
///
/// Invariants
/// ----------
/// - `truncate` is finite and >= 0.
/// - `sigma` is not NaN. Positivity is only required once a transition has
///   to be modeled (sequences of length >= 2), so a single-step problem can
///   still be scored with a placeholder sigma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    sigma: f64,
    truncate: f64,
}

impl ModelParams {
    /// Build a parameter pair.
    ///
    /// # Errors
    /// - `HMMError::InvalidTruncate` for negative / non-finite `truncate`.
    /// - `HMMError::InvalidSigma` for a NaN `sigma`.
    pub fn new(sigma: f64, truncate: f64) -> HMMResult<Self> {
        validate_truncate(truncate)?;
        if sigma.is_nan() {
            validate_sigma(sigma)?;
        }
        Ok(ModelParams { sigma, truncate })
    }

    /// `sigma` with the default cut-off of [`DEFAULT_TRUNCATE`].
    pub fn with_default_truncate(sigma: f64) -> HMMResult<Self> {
        ModelParams::new(sigma, DEFAULT_TRUNCATE)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn truncate(&self) -> f64 {
        self.truncate
    }

    /// New parameters with `sigma` replaced.
    pub fn with_sigma(&self, sigma: f64) -> HMMResult<Self> {
        ModelParams::new(sigma, self.truncate)
    }

    /// New parameters with `truncate` replaced.
    pub fn with_truncate(&self, truncate: f64) -> HMMResult<Self> {
        ModelParams::new(self.sigma, truncate)
    }

    /// Cut-off actually applied by the kernel, in standard deviations:
    /// `truncate` capped at [`MAX_CUTOFF_STD_DEVS`], which also stands in for
    /// `truncate == 0`.
    pub fn effective_truncate(&self) -> f64 {
        if self.truncate == 0.0 {
            MAX_CUTOFF_STD_DEVS
        } else {
            self.truncate.min(MAX_CUTOFF_STD_DEVS)
        }
    }

    /// Maximum displacement over one time unit, `effective_truncate * sigma`.
    pub fn max_displacement(&self) -> f64 {
        self.effective_truncate() * self.sigma
    }
}
