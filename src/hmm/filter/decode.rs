//! Track decoding — turn posteriors into positions.
//!
//! Three read-outs are provided:
//! - [`viterbi`]: the jointly most probable cell path (max-product recursion
//!   in log space with backpointers), using the same kernels, mask and
//!   boundaries as the filters.
//! - [`modal_track`]: the most probable cell of each smoothed marginal.
//! - [`mean_track`]: the probability-weighted mean physical position of each
//!   marginal.
//!
//! Ties are broken towards the first cell in row-major order. Degenerate
//! marginals decode to `None` / NaN; a Viterbi step with no admissible cell is
//! an error because no path exists.
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::{Domain, Grid, Mask},
        kernel::KernelCache,
        normalize::normalized,
        options::FilterOptions,
        params::ModelParams,
        validation::validate_problem_shapes,
    },
    errors::{HMMError, HMMResult},
};
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};

/// ViterbiPath — most probable cell sequence and its log joint probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    /// `(row, col)` per step.
    pub cells: Vec<(usize, usize)>,
    /// Log of prior × transitions × emissions (× terminal) along the path.
    pub log_probability: f64,
}

/// Most probable path for one problem.
///
/// # Errors
/// - Shape and kernel errors as in the forward filter.
/// - `HMMError::DegenerateStep { t, total: 0.0 }` if no valid cell at step `t`
///   is reachable with nonzero probability.
pub fn viterbi(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
    params: &ModelParams, options: &FilterOptions,
) -> HMMResult<ViterbiPath> {
    validate_problem_shapes(domain, emissions, boundaries)?;
    let cache =
        KernelCache::for_sequence(params, domain.grid.spacing, emissions, options.time_scaling)?;

    let mask = &domain.mask;
    let n = emissions.len();
    let (rows, cols) = domain.grid.shape();
    let log_terminal = boundaries.terminal_map().map(|map| normalized(map, mask).0.mapv(f64::ln));

    let log_prior = match boundaries.initial_map() {
        Some(map) => normalized(map, mask).0.mapv(f64::ln),
        None => mask.uniform().mapv(f64::ln),
    };
    let mut delta = log_prior;
    delta += &log_evidence(emissions.map(0), mask);
    if n == 1 {
        if let Some(term) = &log_terminal {
            delta += term;
        }
    }
    check_step(&delta, 0)?;

    let mut backpointers: Vec<Array2<usize>> = Vec::with_capacity(n.saturating_sub(1));
    for t in 1..n {
        let kernel = cache.for_step(emissions, t)?;
        let log_w = kernel.weights().mapv(f64::ln);
        let (ry, rx) = kernel.radius();
        let mut evidence = log_evidence(emissions.map(t), mask);
        if t == n - 1 {
            if let Some(term) = &log_terminal {
                evidence += term;
            }
        }

        let mut next = Array2::from_elem((rows, cols), f64::NEG_INFINITY);
        let mut pointers = Array2::<usize>::zeros((rows, cols));
        for ((r, c), &log_e) in evidence.indexed_iter() {
            if log_e == f64::NEG_INFINITY || log_e.is_nan() {
                continue;
            }
            let mut best = f64::NEG_INFINITY;
            let mut best_src = 0;
            for i in r.saturating_sub(ry)..=(r + ry).min(rows - 1) {
                for j in c.saturating_sub(rx)..=(c + rx).min(cols - 1) {
                    let v = delta[[i, j]] + log_w[[r + ry - i, c + rx - j]];
                    if v > best {
                        best = v;
                        best_src = i * cols + j;
                    }
                }
            }
            next[[r, c]] = best + log_e;
            pointers[[r, c]] = best_src;
        }
        check_step(&next, t)?;
        delta = next;
        backpointers.push(pointers);
    }

    let (mut cell, log_probability) = argmax(delta.view()).ok_or(HMMError::DegenerateStep {
        t: n - 1,
        total: 0.0,
    })?;
    let mut cells = vec![(0, 0); n];
    cells[n - 1] = cell;
    for t in (0..n - 1).rev() {
        let flat = backpointers[t][[cell.0, cell.1]];
        cell = (flat / cols, flat % cols);
        cells[t] = cell;
    }
    Ok(ViterbiPath { cells, log_probability })
}

/// `ln(emission)` on valid cells, `-∞` elsewhere (NaN read as 0).
fn log_evidence(emission: ArrayView2<f64>, mask: &Mask) -> Array2<f64> {
    let mut out = emission.mapv(|v| if v.is_nan() || v <= 0.0 { f64::NEG_INFINITY } else { v.ln() });
    ndarray::Zip::from(&mut out).and(mask.as_array()).for_each(|v, &ok| {
        if !ok {
            *v = f64::NEG_INFINITY;
        }
    });
    out
}

fn check_step(delta: &Array2<f64>, t: usize) -> HMMResult<()> {
    match argmax(delta.view()) {
        Some((_, best)) if best.is_finite() => Ok(()),
        _ => Err(HMMError::DegenerateStep { t, total: 0.0 }),
    }
}

/// First maximal non-NaN cell and its value.
fn argmax(map: ArrayView2<f64>) -> Option<((usize, usize), f64)> {
    let mut best: Option<((usize, usize), f64)> = None;
    for (idx, &v) in map.indexed_iter() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best
}

/// Most probable cell of each marginal (`None` for degenerate steps).
pub fn modal_track(marginals: ArrayView3<f64>) -> Vec<Option<(usize, usize)>> {
    marginals
        .axis_iter(Axis(0))
        .map(|map| {
            let total = map.sum();
            if !(total.is_finite() && total > 0.0) {
                return None;
            }
            argmax(map).map(|(cell, _)| cell)
        })
        .collect()
}

/// Probability-weighted mean `(y, x)` of each marginal, shape `(n, 2)`.
///
/// Degenerate steps give a NaN row.
pub fn mean_track(marginals: ArrayView3<f64>, grid: &Grid) -> Array2<f64> {
    let n = marginals.len_of(Axis(0));
    let mut out = Array2::<f64>::zeros((n, 2));
    for (t, map) in marginals.axis_iter(Axis(0)).enumerate() {
        let (mut total, mut y, mut x) = (0.0, 0.0, 0.0);
        for ((r, c), &p) in map.indexed_iter() {
            let (cy, cx) = grid.coordinates(r, c);
            total += p;
            y += p * cy;
            x += p * cx;
        }
        if total.is_finite() && total > 0.0 {
            out[[t, 0]] = y / total;
            out[[t, 1]] = x / total;
        } else {
            out.row_mut(t).fill(f64::NAN);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::core::{grid::CellSpacing, kernel::DiffusionKernel, options::TimeScaling};
    use approx::assert_relative_eq;
    use ndarray::{Array3, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Viterbi on a deterministic moving target, including its log
    //   probability.
    // - The `DegenerateStep` error when no cell is admissible.
    // - Modal and mean read-outs, including degenerate maps.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Viterbi follows delta observations and reports the path's log
    // probability.
    //
    // Given
    // -----
    // - A 1x3 unit grid, sigma = 1, no truncation.
    // - Emissions: delta at col 0, then col 1, then col 2.
    //
    // Expect
    // ------
    // - Path [(0,0), (0,1), (0,2)].
    // - log p = ln(1/3) + 2·ln(w_1), with w_1 the weight of a one-cell move.
    fn viterbi_follows_deltas() {
        let domain = Domain::unmasked(Grid::new(1, 3, CellSpacing::unit()).unwrap());
        let mut maps = Array3::<f64>::zeros((3, 1, 3));
        for t in 0..3 {
            maps[[t, 0, t]] = 1.0;
        }
        let seq = EmissionSequence::new(maps).unwrap();
        let params = ModelParams::new(1.0, 0.0).unwrap();

        let path = viterbi(
            &domain,
            &seq,
            &BoundaryConditions::none(),
            &params,
            &FilterOptions::default(),
        )
        .unwrap();

        assert_eq!(path.cells, vec![(0, 0), (0, 1), (0, 2)]);
        let kernel =
            DiffusionKernel::build(&params, CellSpacing::unit(), 1.0, TimeScaling::Brownian)
                .unwrap();
        let (ry, rx) = kernel.radius();
        let w1 = kernel.weights()[[ry, rx + 1]];
        assert_relative_eq!(
            path.log_probability,
            (1.0_f64 / 3.0).ln() + 2.0 * w1.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    // Purpose
    // -------
    // A step whose only likely cell is masked has no path.
    //
    // Given
    // -----
    // - 3x3 grid with (1, 1) masked; step 1 emission is a delta at (1, 1).
    //
    // Expect
    // ------
    // - `DegenerateStep { t: 1, .. }`.
    fn viterbi_reports_degenerate_step() {
        let grid = Grid::new(3, 3, CellSpacing::unit()).unwrap();
        let mut valid = Array2::from_elem((3, 3), true);
        valid[[1, 1]] = false;
        let domain = Domain::new(grid, Mask::new(valid)).unwrap();
        let mut maps = Array3::<f64>::ones((2, 3, 3));
        maps.index_axis_mut(Axis(0), 1).fill(0.0);
        maps[[1, 1, 1]] = 1.0;
        let seq = EmissionSequence::new(maps).unwrap();

        let err = viterbi(
            &domain,
            &seq,
            &BoundaryConditions::none(),
            &ModelParams::new(1.0, 4.0).unwrap(),
            &FilterOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, HMMError::DegenerateStep { t: 1, .. }));
    }

    #[test]
    // Purpose
    // -------
    // Modal and mean tracks read the marginals cell by cell.
    //
    // Given
    // -----
    // - Two 2x2 marginals: one concentrated 3:1 on the bottom row, one NaN.
    // - Grid spacing (2, 1) and origin (10, 0).
    //
    // Expect
    // ------
    // - Modal: (1, 1) then None.
    // - Mean: y = 12, x = 0.75 at step 0; NaN at step 1.
    fn modal_and_mean_tracks() {
        let marginals = Array3::from_shape_vec(
            (2, 2, 2),
            vec![0.0, 0.0, 0.25, 0.75, f64::NAN, f64::NAN, 0.0, f64::NAN],
        )
        .unwrap();
        let grid = Grid::new(2, 2, CellSpacing::new(2.0, 1.0).unwrap())
            .unwrap()
            .with_origin((10.0, 0.0));

        let modal = modal_track(marginals.view());
        let mean = mean_track(marginals.view(), &grid);

        assert_eq!(modal, vec![Some((1, 1)), None]);
        assert_relative_eq!(mean[[0, 0]], 12.0);
        assert_relative_eq!(mean[[0, 1]], 0.75);
        assert!(mean[[1, 0]].is_nan());
        assert_eq!(mean.row(0), array![12.0, 0.75]);
    }
}
