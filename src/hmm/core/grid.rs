//! Spatial discretization and validity mask.
//!
//! Purpose
//! -------
//! Describe the regular 2D grid over which the hidden state (the tagged
//! animal's cell) is defined, together with the boolean mask selecting the
//! cells the animal may occupy (e.g. ocean pixels).
//!
//! Key behaviors
//! -------------
//! - [`Grid`] records `(rows, cols)`, the physical cell spacing (possibly
//!   anisotropic) and the coordinate of cell `(0, 0)`.
//! - [`Mask`] wraps an `Array2<bool>` (`true` = valid) and caches the number of
//!   valid cells.
//! - [`Domain`] pairs a grid with a mask of the same shape; it is the unit that
//!   batches of problems share read-only.
//!
//! Invariants & assumptions
//! ------------------------
//! - `rows >= 1`, `cols >= 1`, spacing finite and strictly positive.
//! - A [`Domain`] always has `mask.shape() == grid.shape()`.
//! - None of these types are mutated after construction.
//!
//! Conventions
//! -----------
//! - Arrays are indexed `[row, col]`; rows follow the `y` axis and columns the
//!   `x` axis.
use crate::hmm::errors::{HMMError, HMMResult};
use ndarray::Array2;

/// Physical distance between neighboring cell centers along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpacing {
    /// Distance between consecutive rows.
    pub dy: f64,
    /// Distance between consecutive columns.
    pub dx: f64,
}

impl CellSpacing {
    /// Validate and build a spacing.
    ///
    /// # Errors
    /// - [`HMMError::InvalidSpacing`] if either component is non-finite or <= 0.
    pub fn new(dy: f64, dx: f64) -> HMMResult<Self> {
        if !(dy.is_finite() && dy > 0.0 && dx.is_finite() && dx > 0.0) {
            return Err(HMMError::InvalidSpacing { dy, dx });
        }
        Ok(CellSpacing { dy, dx })
    }

    /// Unit spacing along both axes.
    pub fn unit() -> Self {
        CellSpacing { dy: 1.0, dx: 1.0 }
    }
}

impl Default for CellSpacing {
    fn default() -> Self {
        CellSpacing::unit()
    }
}

/// `Grid` — regular 2D spatial index with physical spacing.
///
/// Fields
/// ------
/// - `rows`, `cols`: grid dimensions (both >= 1).
/// - `spacing`: [`CellSpacing`] in the same unit as `sigma`.
/// - `origin`: `(y, x)` coordinate of cell `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub spacing: CellSpacing,
    pub origin: (f64, f64),
}

impl Grid {
    /// Construct a grid anchored at the origin `(0, 0)`.
    ///
    /// # Errors
    /// - [`HMMError::InvalidGridShape`] if `rows == 0` or `cols == 0`.
    pub fn new(rows: usize, cols: usize, spacing: CellSpacing) -> HMMResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(HMMError::InvalidGridShape { rows, cols });
        }
        Ok(Grid { rows, cols, spacing, origin: (0.0, 0.0) })
    }

    /// Return a copy of this grid anchored at `origin`.
    pub fn with_origin(self, origin: (f64, f64)) -> Self {
        Grid { origin, ..self }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    pub fn n_cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Physical `(y, x)` coordinate of the center of cell `(row, col)`.
    pub fn coordinates(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin.0 + row as f64 * self.spacing.dy,
            self.origin.1 + col as f64 * self.spacing.dx,
        )
    }
}

/// `Mask` — which cells are traversable.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    valid: Array2<bool>,
    n_valid: usize,
}

impl Mask {
    /// Wrap a boolean array (`true` = valid cell).
    pub fn new(valid: Array2<bool>) -> Self {
        let n_valid = valid.iter().filter(|&&v| v).count();
        Mask { valid, n_valid }
    }

    /// A mask with every cell of `grid` valid.
    pub fn all_valid(grid: &Grid) -> Self {
        Mask::new(Array2::from_elem(grid.shape(), true))
    }

    /// `(rows, cols)` of the underlying array.
    pub fn shape(&self) -> (usize, usize) {
        self.valid.dim()
    }

    /// Number of valid cells.
    pub fn n_valid(&self) -> usize {
        self.n_valid
    }

    /// Whether cell `(row, col)` is valid.
    #[inline]
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.valid[[row, col]]
    }

    /// Borrow the boolean array.
    pub fn as_array(&self) -> &Array2<bool> {
        &self.valid
    }

    /// Uniform distribution over the valid cells (all zeros when no cell is
    /// valid).
    pub fn uniform(&self) -> Array2<f64> {
        if self.n_valid == 0 {
            return Array2::zeros(self.valid.dim());
        }
        let weight = 1.0 / self.n_valid as f64;
        self.valid.mapv(|v| if v { weight } else { 0.0 })
    }
}

/// `Domain` — a grid together with a mask of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub grid: Grid,
    pub mask: Mask,
}

impl Domain {
    /// Pair a grid with its mask.
    ///
    /// # Errors
    /// - [`HMMError::ShapeMismatch`] if the mask shape differs from the grid.
    pub fn new(grid: Grid, mask: Mask) -> HMMResult<Self> {
        if mask.shape() != grid.shape() {
            return Err(HMMError::ShapeMismatch {
                what: "mask",
                expected: grid.shape(),
                actual: mask.shape(),
            });
        }
        Ok(Domain { grid, mask })
    }

    /// Domain over `grid` with every cell valid.
    pub fn unmasked(grid: Grid) -> Self {
        let mask = Mask::all_valid(&grid);
        Domain { grid, mask }
    }
}
