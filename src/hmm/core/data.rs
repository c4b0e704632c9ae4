//! Observation containers: emission sequences and boundary conditions.
//!
//! Purpose
//! -------
//! Provide small, validated containers for the per-step emission likelihood
//! maps of one tagged individual and for the optional distributions pinning
//! its first and last positions.
//!
//! Key behaviors
//! -------------
//! - [`EmissionSequence`] stores a `t × rows × cols` stack of nonnegative
//!   likelihood maps plus optional inter-observation intervals.
//! - [`BoundaryConditions`] stores optional initial and terminal maps; an
//!   absent map always means "uniform over the valid cells".
//! - Both offer the explicit reversal used by the backward pass
//!   ([`EmissionSequence::reversed`], [`BoundaryConditions::swapped`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one time step.
//! - Emission entries are finite and >= 0, or NaN (read as zero likelihood).
//! - Intervals, when present, have length `n_steps - 1` and are finite and > 0.
//! - Boundary entries are finite and >= 0; they need not be normalized.
//!
//! Conventions
//! -----------
//! - Index 0 is the earliest observation. `intervals[t - 1]` is the elapsed
//!   time between steps `t - 1` and `t`. Missing intervals mean unit spacing.
//! - Shapes against a particular grid are checked by the filters, not here,
//!   so the same sequence can be validated once and reused.
use crate::hmm::{
    core::validation::{validate_boundary, validate_emissions, validate_intervals},
    errors::HMMResult,
};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, s};

/// `EmissionSequence` — ordered likelihood maps for one individual.
///
/// Fields
/// ------
/// - `maps`: `Array3<f64>` with shape `(n_steps, rows, cols)`.
/// - `intervals`: `Option<Array1<f64>>` of length `n_steps - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionSequence {
    maps: Array3<f64>,
    intervals: Option<Array1<f64>>,
}

impl EmissionSequence {
    /// Build a sequence with unit spacing between observations.
    ///
    /// # Errors
    /// - `HMMError::EmptySequence` when `maps` has no time steps.
    /// - `HMMError::InvalidEmission` for negative or infinite entries.
    pub fn new(maps: Array3<f64>) -> HMMResult<Self> {
        validate_emissions(maps.view())?;
        Ok(EmissionSequence { maps, intervals: None })
    }

    /// Build a sequence with explicit (possibly irregular) intervals.
    ///
    /// # Errors
    /// - Everything [`EmissionSequence::new`] reports.
    /// - `HMMError::IntervalLengthMismatch` / `HMMError::InvalidInterval`.
    pub fn with_intervals(maps: Array3<f64>, intervals: Array1<f64>) -> HMMResult<Self> {
        validate_emissions(maps.view())?;
        validate_intervals(intervals.view(), maps.dim().0)?;
        Ok(EmissionSequence { maps, intervals: Some(intervals) })
    }

    /// Number of observation instants.
    pub fn len(&self) -> usize {
        self.maps.dim().0
    }

    /// Always false for a constructed sequence; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(rows, cols)` of each map.
    pub fn map_shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.maps.dim();
        (rows, cols)
    }

    /// Emission map at step `t`.
    pub fn map(&self, t: usize) -> ArrayView2<'_, f64> {
        self.maps.index_axis(Axis(0), t)
    }

    /// Borrow the full stack.
    pub fn maps(&self) -> &Array3<f64> {
        &self.maps
    }

    /// Optional interval vector.
    pub fn intervals(&self) -> Option<&Array1<f64>> {
        self.intervals.as_ref()
    }

    /// Elapsed time between steps `t - 1` and `t` (`t >= 1`).
    pub fn interval(&self, t: usize) -> f64 {
        match &self.intervals {
            Some(intervals) => intervals[t - 1],
            None => 1.0,
        }
    }

    /// The same observations in reverse temporal order.
    pub fn reversed(&self) -> EmissionSequence {
        EmissionSequence {
            maps: self.maps.slice(s![..;-1, .., ..]).to_owned(),
            intervals: self.intervals.as_ref().map(|iv| iv.slice(s![..;-1]).to_owned()),
        }
    }
}

/// `BoundaryConditions` — optional constraints on the first and last state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryConditions {
    initial: Option<Array2<f64>>,
    terminal: Option<Array2<f64>>,
}

impl BoundaryConditions {
    /// No constraint at either end.
    pub fn none() -> Self {
        BoundaryConditions::default()
    }

    /// Build from optional maps.
    ///
    /// # Errors
    /// - `HMMError::InvalidBoundary` for negative or non-finite entries.
    pub fn new(initial: Option<Array2<f64>>, terminal: Option<Array2<f64>>) -> HMMResult<Self> {
        if let Some(map) = &initial {
            validate_boundary("initial", map.view())?;
        }
        if let Some(map) = &terminal {
            validate_boundary("terminal", map.view())?;
        }
        Ok(BoundaryConditions { initial, terminal })
    }

    /// Known release position only.
    pub fn initial(map: Array2<f64>) -> HMMResult<Self> {
        BoundaryConditions::new(Some(map), None)
    }

    pub fn initial_map(&self) -> Option<&Array2<f64>> {
        self.initial.as_ref()
    }

    pub fn terminal_map(&self) -> Option<&Array2<f64>> {
        self.terminal.as_ref()
    }

    /// Exchange the initial and terminal roles (used by the backward pass).
    pub fn swapped(&self) -> BoundaryConditions {
        BoundaryConditions { initial: self.terminal.clone(), terminal: self.initial.clone() }
    }
}
