//! utils — conversion helpers between Python objects and the HMM containers.
//!
//! Everything here is FFI glue used by the PyO3 classes in `lib.rs`: it turns
//! numpy arrays (or objects exposing `to_numpy`) into owned `ndarray` values
//! and assembles a validated [`TrackingProblem`]. Validation itself is left to
//! the core constructors; their errors surface as `ValueError` through the
//! `From<HMMError> for PyErr` conversion.
#[cfg(feature = "python-bindings")]
use std::sync::Arc;

#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, Array3};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3};

#[cfg(feature = "python-bindings")]
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::{CellSpacing, Domain, Grid, Mask},
    },
    models::batch::TrackingProblem,
};

/// 1-D float64 array from an ndarray, a pandas Series or a plain sequence.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array1(raw: &Bound<'_, PyAny>) -> PyResult<Array1<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    let vec: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(Array1::from(vec))
}

/// 2-D float64 map (row-major grid layout).
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array2(raw: &Bound<'_, PyAny>, what: &str) -> PyResult<Array2<f64>> {
    raw.extract::<PyReadonlyArray2<f64>>()
        .map(|arr| arr.as_array().to_owned())
        .map_err(|_| PyTypeError::new_err(format!("{what} must be a 2-D float64 numpy.ndarray")))
}

/// 3-D float64 stack `(n_steps, rows, cols)`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array3(raw: &Bound<'_, PyAny>, what: &str) -> PyResult<Array3<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray3<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    // xarray.DataArray exposes `to_numpy()`.
    if let Ok(obj) = raw.call_method0("to_numpy") {
        if let Ok(arr) = obj.extract::<PyReadonlyArray3<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    Err(PyTypeError::new_err(format!("{what} must be a 3-D float64 array")))
}

/// Boolean mask; `True` marks a cell the animal may occupy.
#[cfg(feature = "python-bindings")]
pub fn extract_mask(raw: &Bound<'_, PyAny>) -> PyResult<Array2<bool>> {
    raw.extract::<PyReadonlyArray2<bool>>()
        .map(|arr| arr.as_array().to_owned())
        .map_err(|_| PyTypeError::new_err("mask must be a 2-D bool numpy.ndarray"))
}

/// Build a [`TrackingProblem`] from Python inputs.
///
/// The grid shape is taken from the emission stack; a missing mask means every
/// cell is valid.
#[cfg(feature = "python-bindings")]
pub fn build_problem<'py>(
    emission: &Bound<'py, PyAny>, mask: Option<&Bound<'py, PyAny>>,
    initial: Option<&Bound<'py, PyAny>>, terminal: Option<&Bound<'py, PyAny>>,
    spacing: (f64, f64), intervals: Option<&Bound<'py, PyAny>>,
) -> PyResult<TrackingProblem> {
    let maps = extract_f64_array3(emission, "emission")?;
    let (_, rows, cols) = maps.dim();
    let grid = Grid::new(rows, cols, CellSpacing::new(spacing.0, spacing.1)?)?;
    let domain = match mask {
        Some(raw) => Domain::new(grid, Mask::new(extract_mask(raw)?))?,
        None => Domain::unmasked(grid),
    };

    let emissions = match intervals {
        Some(raw) => EmissionSequence::with_intervals(maps, extract_f64_array1(raw)?)?,
        None => EmissionSequence::new(maps)?,
    };

    let initial = initial.map(|raw| extract_f64_array2(raw, "initial")).transpose()?;
    let terminal = terminal.map(|raw| extract_f64_array2(raw, "final")).transpose()?;
    let boundaries = BoundaryConditions::new(initial, terminal)?;

    Ok(TrackingProblem::new(Arc::new(domain), emissions, boundaries)?)
}
