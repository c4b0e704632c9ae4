//! Errors for the gridded random-walk HMM (parameter checks, shape checks,
//! input validation, and degenerate filter steps).
//!
//! This module defines the model error type, [`HMMError`], and a coarse
//! classification, [`ErrorKind`], used by callers that only need to know which
//! family a failure belongs to. `HMMError` implements `Display`/`Error` and
//! converts to `PyErr` when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (time steps, rows, columns).
//! - Shapes are reported as `(rows, cols)`.
//! - Parameter and shape errors are fatal for the invocation that raised them.
//! - A degenerate step (zero or non-finite mass after masking) is normally
//!   carried as a value inside the filter results; [`HMMError::DegenerateStep`]
//!   only appears when a caller explicitly asks for a strict check or when a
//!   decoder cannot produce a path at all.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for HMM operations that may produce [`HMMError`].
pub type HMMResult<T> = Result<T, HMMError>;

/// Coarse error family.
///
/// - `InvalidParameter`: sigma, truncate, spacing, or time intervals.
/// - `ShapeMismatch`: emission maps, masks, boundaries, or intervals whose
///   dimensions disagree with the grid or sequence.
/// - `InvalidInput`: malformed values in otherwise well-shaped inputs.
/// - `DegenerateStep`: a step whose masked mass is zero or non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    ShapeMismatch,
    InvalidInput,
    DegenerateStep,
}

/// Unified error type for the HMM stack.
#[derive(Debug, Clone, PartialEq)]
pub enum HMMError {
    // ---- Parameters ----
    /// Sigma must be finite and > 0 whenever a transition is modeled.
    InvalidSigma { value: f64 },

    /// Truncate must be finite and >= 0 (0 disables truncation).
    InvalidTruncate { value: f64 },

    /// Time interval between two observations must be finite and > 0.
    InvalidInterval { index: usize, value: f64 },

    /// Cell spacing must be finite and > 0 along both axes.
    InvalidSpacing { dy: f64, dx: f64 },

    /// Grid must have at least one row and one column.
    InvalidGridShape { rows: usize, cols: usize },

    /// Unknown time-scaling name.
    InvalidTimeScaling { name: String },

    // ---- Shapes ----
    /// A map does not have the grid shape.
    ShapeMismatch { what: &'static str, expected: (usize, usize), actual: (usize, usize) },

    /// Interval vector length must be `n_steps - 1`.
    IntervalLengthMismatch { expected: usize, actual: usize },

    /// Emission sequence has no time steps.
    EmptySequence,

    // ---- Input values ----
    /// Emission likelihoods must be >= 0 and finite (NaN is read as 0).
    InvalidEmission { t: usize, row: usize, col: usize, value: f64 },

    /// Boundary distributions must be >= 0 and finite.
    InvalidBoundary { which: &'static str, row: usize, col: usize, value: f64 },

    // ---- Filter state ----
    /// Masked mass at step `t` was zero or non-finite.
    DegenerateStep { t: usize, total: f64 },
}

impl HMMError {
    /// Classify the error into its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            HMMError::InvalidSigma { .. }
            | HMMError::InvalidTruncate { .. }
            | HMMError::InvalidInterval { .. }
            | HMMError::InvalidSpacing { .. }
            | HMMError::InvalidGridShape { .. }
            | HMMError::InvalidTimeScaling { .. } => ErrorKind::InvalidParameter,
            HMMError::ShapeMismatch { .. }
            | HMMError::IntervalLengthMismatch { .. }
            | HMMError::EmptySequence => ErrorKind::ShapeMismatch,
            HMMError::InvalidEmission { .. } | HMMError::InvalidBoundary { .. } => {
                ErrorKind::InvalidInput
            }
            HMMError::DegenerateStep { .. } => ErrorKind::DegenerateStep,
        }
    }
}

impl std::error::Error for HMMError {}

impl std::fmt::Display for HMMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Parameters ----
            HMMError::InvalidSigma { value } => {
                write!(f, "sigma must be finite and > 0 when a transition is required; got: {value}")
            }
            HMMError::InvalidTruncate { value } => {
                write!(f, "truncate must be finite and >= 0; got: {value}")
            }
            HMMError::InvalidInterval { index, value } => {
                write!(f, "Time interval at index {index} must be finite and > 0; got: {value}")
            }
            HMMError::InvalidSpacing { dy, dx } => {
                write!(f, "Cell spacing must be finite and > 0; got: (dy={dy}, dx={dx})")
            }
            HMMError::InvalidGridShape { rows, cols } => {
                write!(f, "Grid must have at least one row and column; got: {rows}x{cols}")
            }
            HMMError::InvalidTimeScaling { name } => {
                write!(
                    f,
                    "Invalid time scaling {name:?}; valid options are case insensitive 'brownian' or 'ballistic'."
                )
            }
            // ---- Shapes ----
            HMMError::ShapeMismatch { what, expected, actual } => {
                write!(
                    f,
                    "{what} shape mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            HMMError::IntervalLengthMismatch { expected, actual } => {
                write!(f, "Interval length mismatch: expected {expected}, got {actual}")
            }
            HMMError::EmptySequence => {
                write!(f, "Emission sequence is empty.")
            }
            // ---- Input values ----
            HMMError::InvalidEmission { t, row, col, value } => {
                write!(
                    f,
                    "Emission at step {t}, cell ({row}, {col}) must be finite and >= 0; got: {value}"
                )
            }
            HMMError::InvalidBoundary { which, row, col, value } => {
                write!(
                    f,
                    "{which} boundary at cell ({row}, {col}) must be finite and >= 0; got: {value}"
                )
            }
            // ---- Filter state ----
            HMMError::DegenerateStep { t, total } => {
                write!(f, "Step {t} has no admissible probability mass (total = {total}).")
            }
        }
    }
}

/// Convert an [`HMMError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl From<HMMError> for PyErr {
    fn from(err: HMMError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
