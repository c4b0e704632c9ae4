//! rust_tagtrack — gridded random-walk HMM for tagged-animal tracks, with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the track estimator to Python via the `_rust_tagtrack` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing classes and submodules used by the `rust_tagtrack` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`hmm` and `emission`) as the public
//!   crate surface.
//! - Define the `GaussianRandomWalk` `#[pyclass]` (estimator with
//!   `predict_proba`, `score`, `decode`, `score_sweep` and `set_params`), the
//!   `emission_likelihood` function, and the `#[pymodule]` initializer.
//! - Register the `hmm` and `emission` submodules under `rust_tagtrack` so
//!   that dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input conversion and error mapping.
//! - The Python estimator is immutable: `set_params` returns a new object,
//!   mirroring [`RandomWalkEstimator::with_params`].
//! - Filter runs release the GIL; inputs are copied into owned arrays first.
//!
//! Conventions
//! -----------
//! - Emission stacks are `(n_steps, rows, cols)` float64 arrays; masks are
//!   `(rows, cols)` bool arrays with `True` for valid cells.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary; type mismatches raise `TypeError`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`hmm`] and [`emission`] directly and
//!   can ignore the items guarded by `python-bindings`.
//! - The Python packaging layer imports `_rust_tagtrack` and wraps its classes
//!   in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_hmm_pipeline.rs`.
//! - The bindings are exercised from Python against the compiled extension.

pub mod emission;
pub mod hmm;
pub mod utils;

#[cfg(feature = "python-bindings")]
use crate::{
    emission::likelihood::emission_sequence,
    hmm::{
        core::{options::FilterOptions, params::ModelParams},
        models::estimator::RandomWalkEstimator,
    },
    utils::{build_problem, extract_f64_array1, extract_f64_array3},
};
#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray3};
#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

/// GaussianRandomWalk — Python-facing wrapper for [`RandomWalkEstimator`].
///
/// Purpose
/// -------
/// Reconstruct the position distribution of a tagged animal on a grid given
/// one emission likelihood map per observation, under a Gaussian random walk
/// with spread `sigma` (grid units per unit time) truncated at `truncate`
/// standard deviations.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_tagtrack.hmm", frozen)]
pub struct GaussianRandomWalk {
    /// Underlying Rust estimator.
    pub inner: RandomWalkEstimator,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl GaussianRandomWalk {
    #[new]
    #[pyo3(
        signature = (sigma, truncate = 4.0, time_scaling = None),
        text_signature = "(sigma, /, truncate=4.0, time_scaling=None)"
    )]
    pub fn new(sigma: f64, truncate: f64, time_scaling: Option<&str>) -> PyResult<Self> {
        let params = ModelParams::new(sigma, truncate)?;
        let options = FilterOptions::from_name(time_scaling)?;
        Ok(GaussianRandomWalk { inner: RandomWalkEstimator::new(params, options) })
    }

    /// Spread of the random walk per unit time.
    #[getter]
    pub fn sigma(&self) -> f64 {
        self.inner.params().sigma()
    }

    /// Kernel cut-off in standard deviations (0 disables truncation).
    #[getter]
    pub fn truncate(&self) -> f64 {
        self.inner.params().truncate()
    }

    /// A new estimator with the given parameters replaced.
    #[pyo3(signature = (sigma = None, truncate = None))]
    pub fn set_params(&self, sigma: Option<f64>, truncate: Option<f64>) -> PyResult<Self> {
        let current = self.inner.params();
        let params = ModelParams::new(
            sigma.unwrap_or(current.sigma()),
            truncate.unwrap_or(current.truncate()),
        )?;
        Ok(GaussianRandomWalk { inner: self.inner.with_params(params) })
    }

    /// Smoothed state probabilities, shape `(n_steps, rows, cols)`.
    #[pyo3(signature = (
        emission, mask = None, initial = None, terminal = None,
        spacing = (1.0, 1.0), intervals = None,
    ))]
    pub fn predict_proba<'py>(
        &self, py: Python<'py>, emission: &Bound<'py, PyAny>, mask: Option<&Bound<'py, PyAny>>,
        initial: Option<&Bound<'py, PyAny>>, terminal: Option<&Bound<'py, PyAny>>,
        spacing: (f64, f64), intervals: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Bound<'py, PyArray3<f64>>> {
        let problem = build_problem(emission, mask, initial, terminal, spacing, intervals)?;
        let estimator = self.inner;
        let marginals = py.allow_threads(move || estimator.predict_proba(&problem))?;
        Ok(marginals.into_pyarray(py))
    }

    /// Negative log-likelihood of the observations (`inf`/`nan` when the
    /// track is impossible).
    #[pyo3(signature = (
        emission, mask = None, initial = None, terminal = None,
        spacing = (1.0, 1.0), intervals = None,
    ))]
    pub fn score<'py>(
        &self, py: Python<'py>, emission: &Bound<'py, PyAny>, mask: Option<&Bound<'py, PyAny>>,
        initial: Option<&Bound<'py, PyAny>>, terminal: Option<&Bound<'py, PyAny>>,
        spacing: (f64, f64), intervals: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<f64> {
        let problem = build_problem(emission, mask, initial, terminal, spacing, intervals)?;
        let estimator = self.inner;
        Ok(py.allow_threads(move || estimator.score(&problem))?)
    }

    /// Most probable cell path as `([(row, col), ...], log_probability)`.
    #[pyo3(signature = (
        emission, mask = None, initial = None, terminal = None,
        spacing = (1.0, 1.0), intervals = None,
    ))]
    pub fn decode<'py>(
        &self, py: Python<'py>, emission: &Bound<'py, PyAny>, mask: Option<&Bound<'py, PyAny>>,
        initial: Option<&Bound<'py, PyAny>>, terminal: Option<&Bound<'py, PyAny>>,
        spacing: (f64, f64), intervals: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<(Vec<(usize, usize)>, f64)> {
        let problem = build_problem(emission, mask, initial, terminal, spacing, intervals)?;
        let estimator = self.inner;
        let path = py.allow_threads(move || estimator.decode(&problem))?;
        Ok((path.cells, path.log_probability))
    }

    /// Score the same observations under each `sigma` (truncate unchanged).
    #[pyo3(signature = (
        emission, sigmas, mask = None, initial = None, terminal = None,
        spacing = (1.0, 1.0), intervals = None,
    ))]
    pub fn score_sweep<'py>(
        &self, py: Python<'py>, emission: &Bound<'py, PyAny>, sigmas: &Bound<'py, PyAny>,
        mask: Option<&Bound<'py, PyAny>>, initial: Option<&Bound<'py, PyAny>>,
        terminal: Option<&Bound<'py, PyAny>>, spacing: (f64, f64),
        intervals: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Vec<f64>> {
        let problem = build_problem(emission, mask, initial, terminal, spacing, intervals)?;
        let base = self.inner.params();
        let candidates = extract_f64_array1(sigmas)?
            .iter()
            .map(|&sigma| base.with_sigma(sigma))
            .collect::<Result<Vec<_>, _>>()?;
        let estimator = self.inner;
        let scores = py.allow_threads(move || estimator.score_sweep(&problem, &candidates));
        Ok(scores.into_iter().collect::<Result<Vec<_>, _>>()?)
    }

    fn __repr__(&self) -> String {
        format!("GaussianRandomWalk(sigma={}, truncate={})", self.sigma(), self.truncate())
    }
}

/// Emission likelihood maps from a `(n_steps, rows, cols)` residual stack.
///
/// Residuals are scored by a Normal(0, scale) density; NaN cells get 0 and an
/// all-NaN step becomes a map of ones.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (residuals, scale))]
fn emission_likelihood<'py>(
    py: Python<'py>, residuals: &Bound<'py, PyAny>, scale: f64,
) -> PyResult<Bound<'py, PyArray3<f64>>> {
    let residuals = extract_f64_array3(residuals, "residuals")?;
    let sequence = emission_sequence(residuals.view(), scale, None)?;
    Ok(sequence.maps().clone().into_pyarray(py))
}

/// Initialize the `_rust_tagtrack` extension module.
///
/// Creates the `hmm` and `emission` submodules, attaches them to the parent
/// module and registers them in `sys.modules` under `rust_tagtrack.<name>` so
/// `import rust_tagtrack.hmm` works.
///
/// Errors
/// ------
/// - `PyErr` if creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_tagtrack<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let hmm_mod = PyModule::new(_py, "hmm")?;
    let emission_mod = PyModule::new(_py, "emission")?;
    hmm_models(_py, m, &hmm_mod)?;
    emission_models(_py, m, &emission_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    let modules = _py.import("sys")?.getattr("modules")?;
    modules.set_item("rust_tagtrack.hmm", hmm_mod)?;
    modules.set_item("rust_tagtrack.emission", emission_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn hmm_models<'py>(
    _py: Python, rust_tagtrack: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<GaussianRandomWalk>()?;
    rust_tagtrack.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn emission_models<'py>(
    _py: Python, rust_tagtrack: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(emission_likelihood, m)?)?;
    rust_tagtrack.add_submodule(m)?;
    Ok(())
}
