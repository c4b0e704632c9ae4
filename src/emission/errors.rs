//! emission::errors — error type for residual and likelihood construction.
//!
//! [`EmissionError`] covers malformed profiles and reference fields plus an
//! invalid likelihood spread. Failures of the HMM containers built at the end
//! of the pipeline (e.g. interval validation) are wrapped through
//! `From<HMMError>`. Undefined statistics (depth gate not met, no matched
//! samples) are NOT errors: they are NaN values that the likelihood step
//! turns into non-informative emissions.
use crate::hmm::errors::HMMError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type EmissionResult<T> = Result<T, EmissionError>;

/// EmissionError — failures while turning profiles into emission maps.
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionError {
    /// Likelihood standard deviation must be finite and > 0.
    InvalidStd { value: f64 },

    /// Paired arrays disagree in length or shape.
    ShapeMismatch { what: &'static str, expected: Vec<usize>, actual: Vec<usize> },

    /// An observed profile has no samples.
    EmptyProfile,

    /// Building the emission sequence failed.
    Sequence(HMMError),
}

impl std::error::Error for EmissionError {}

impl std::fmt::Display for EmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmissionError::InvalidStd { value } => {
                write!(f, "Likelihood std must be finite and > 0; got: {value}")
            }
            EmissionError::ShapeMismatch { what, expected, actual } => {
                write!(f, "{what} shape mismatch: expected {expected:?}, got {actual:?}")
            }
            EmissionError::EmptyProfile => {
                write!(f, "Observed profile has no samples.")
            }
            EmissionError::Sequence(err) => {
                write!(f, "Invalid emission sequence: {err}")
            }
        }
    }
}

impl From<HMMError> for EmissionError {
    fn from(err: HMMError) -> Self {
        EmissionError::Sequence(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<EmissionError> for PyErr {
    fn from(err: EmissionError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
