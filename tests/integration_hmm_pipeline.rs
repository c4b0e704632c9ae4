//! Integration tests for the gridded random-walk HMM.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline through the public API: domain and
//!   observation containers, kernel construction, forward filter, backward
//!   pass, smoother, scorer, decoders and the estimator façade.
//! - Pin down the small hand-checkable scenarios (uniform evidence, a
//!   delta observation, an impossible observation, direction symmetry).
//!
//! Coverage
//! --------
//! - `hmm::filter`: `forward`, `backward`, `forward_backward`, `score`,
//!   `modal_track`.
//! - `hmm::core`: `DiffusionKernel::build` determinism, grid independence
//!   and the truncation limit.
//! - `hmm::models`: `RandomWalkEstimator` single, batch and sweep calls.
//! - `emission`: residuals from reference columns feeding the estimator.
//!
//! Exclusions
//! ----------
//! - Low-level checks (validation routines, normalization edge cases, kernel
//!   taps) are covered by unit tests.
//! - Python bindings are tested from Python against the compiled extension.
use std::sync::Arc;

use approx::assert_relative_eq;
use ndarray::{Array1, Array2, Array3, array};
use rust_tagtrack::{
    emission::{
        likelihood::emission_sequence,
        profile::{DEFAULT_DEPTH_THRESHOLD, ReferenceField, TagProfile, residual_sequence},
    },
    hmm::{
        core::{
            data::{BoundaryConditions, EmissionSequence},
            grid::{CellSpacing, Domain, Grid, Mask},
            kernel::DiffusionKernel,
            options::{FilterOptions, TimeScaling},
            params::ModelParams,
        },
        errors::HMMError,
        filter::{backward, forward, forward_backward, modal_track, score},
        models::{ProblemBatch, RandomWalkEstimator, TrackingProblem},
    },
};

/// Unmasked `rows x cols` domain with unit spacing.
fn open_domain(rows: usize, cols: usize) -> Domain {
    Domain::unmasked(Grid::new(rows, cols, CellSpacing::unit()).unwrap())
}

/// 5x5 domain with two land cells.
fn coastal_domain() -> Domain {
    let grid = Grid::new(5, 5, CellSpacing::unit()).unwrap();
    let mut valid = Array2::from_elem((5, 5), true);
    valid[[0, 4]] = false;
    valid[[3, 1]] = false;
    Domain::new(grid, Mask::new(valid)).unwrap()
}

/// Strictly positive, spatially varying emissions with irregular intervals.
fn varied_emissions(n: usize, rows: usize, cols: usize) -> EmissionSequence {
    let maps = Array3::from_shape_fn((n, rows, cols), |(t, i, j)| {
        0.1 + ((3 * t + 2 * i + 5 * j) % 7) as f64 / 7.0
    });
    let intervals = Array1::from_shape_fn(n - 1, |t| if t % 2 == 0 { 1.0 } else { 0.5 });
    EmissionSequence::with_intervals(maps, intervals).unwrap()
}

fn brownian() -> FilterOptions {
    FilterOptions::new(TimeScaling::Brownian)
}

#[test]
// Purpose
// -------
// Uniform evidence under a delta kernel leaves the posterior uniform.
//
// Given
// -----
// - An unmasked 3x3 grid, sigma = 0.1 (sub-cell spread, single-tap kernel).
// - Two steps of all-ones emissions, no boundaries.
//
// Expect
// ------
// - Every smoothed marginal is 1/9 everywhere.
// - Both constants are 1, so the score is finite (0).
fn scenario_uniform_evidence_stays_uniform() {
    let domain = open_domain(3, 3);
    let emissions = EmissionSequence::new(Array3::ones((2, 3, 3))).unwrap();
    let params = ModelParams::new(0.1, 4.0).unwrap();

    let post = forward_backward(&domain, &emissions, &BoundaryConditions::none(), &params, &brownian())
        .unwrap();
    let nll = score(&domain, &emissions, &BoundaryConditions::none(), &params, &brownian()).unwrap();

    for &p in post.marginals().iter() {
        assert_relative_eq!(p, 1.0 / 9.0, epsilon = 1e-12);
    }
    for &c in post.constants().iter() {
        assert_relative_eq!(c, 1.0, epsilon = 1e-12);
    }
    assert!(nll.is_finite());
    assert_relative_eq!(nll, 0.0, epsilon = 1e-12);
}

#[test]
// Purpose
// -------
// Uniform evidence under a real 3x3 stencil keeps the grid's symmetries.
// Mass leaks through the zero-padded edge, so the marginals are no longer
// uniform.
//
// Given
// -----
// - An unmasked 3x3 grid, sigma = 1, truncate = 1.5 (radius 1, corners
//   included).
// - Two steps of all-ones emissions, no boundaries.
//
// Expect
// ------
// - Every marginal sums to 1 and is invariant under a row flip, a column
//   flip and a transpose (within 1e-12).
// - The score is finite and positive.
fn scenario_uniform_evidence_with_stencil_is_symmetric() {
    let domain = open_domain(3, 3);
    let emissions = EmissionSequence::new(Array3::ones((2, 3, 3))).unwrap();
    let params = ModelParams::new(1.0, 1.5).unwrap();
    let none = BoundaryConditions::none();

    let post = forward_backward(&domain, &emissions, &none, &params, &brownian()).unwrap();
    let nll = score(&domain, &emissions, &none, &params, &brownian()).unwrap();

    for t in 0..2 {
        let m = post.marginal(t);
        assert_relative_eq!(m.sum(), 1.0, epsilon = 1e-12);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(m[[i, j]], m[[2 - i, j]], epsilon = 1e-12);
                assert_relative_eq!(m[[i, j]], m[[i, 2 - j]], epsilon = 1e-12);
                assert_relative_eq!(m[[i, j]], m[[j, i]], epsilon = 1e-12);
            }
        }
    }
    assert!(nll.is_finite());
    assert!(nll > 0.0);
}

#[test]
// Purpose
// -------
// A delta observation pins the filtered state.
//
// Given
// -----
// - An unmasked 3x3 grid, sigma = 1.
// - Step 0: all-ones emission; step 1: emission 1 at (0, 0), 0 elsewhere.
//
// Expect
// ------
// - `filtered_1` is exactly the delta at (0, 0).
fn scenario_delta_observation_pins_state() {
    let domain = open_domain(3, 3);
    let mut maps = Array3::<f64>::ones((2, 3, 3));
    maps.index_axis_mut(ndarray::Axis(0), 1).fill(0.0);
    maps[[1, 0, 0]] = 1.0;
    let emissions = EmissionSequence::new(maps).unwrap();
    let params = ModelParams::new(1.0, 4.0).unwrap();

    let trace =
        forward(&domain, &emissions, &BoundaryConditions::none(), &params, &brownian()).unwrap();

    let mut expected = Array2::<f64>::zeros((3, 3));
    expected[[0, 0]] = 1.0;
    assert_eq!(trace.filtered_at(1), expected);
}

#[test]
// Purpose
// -------
// Evidence that only a masked cell can explain is a degenerate step.
//
// Given
// -----
// - A 3x3 grid with (1, 1) masked out.
// - Two steps whose emission is 1 at (1, 1) and 0 elsewhere.
//
// Expect
// ------
// - `c_0 == 0`, the score is not finite.
// - `ensure_finite` reports `DegenerateStep { t: 0, total: 0 }`.
// - Masked cells stay exactly 0 in every filtered map.
fn scenario_impossible_observation_is_degenerate() {
    let grid = Grid::new(3, 3, CellSpacing::unit()).unwrap();
    let mut valid = Array2::from_elem((3, 3), true);
    valid[[1, 1]] = false;
    let domain = Domain::new(grid, Mask::new(valid)).unwrap();
    let mut maps = Array3::<f64>::zeros((2, 3, 3));
    maps[[0, 1, 1]] = 1.0;
    maps[[1, 1, 1]] = 1.0;
    let emissions = EmissionSequence::new(maps).unwrap();
    let params = ModelParams::new(1.0, 4.0).unwrap();

    let trace =
        forward(&domain, &emissions, &BoundaryConditions::none(), &params, &brownian()).unwrap();
    let nll = score(&domain, &emissions, &BoundaryConditions::none(), &params, &brownian()).unwrap();

    assert_eq!(trace.constants()[0], 0.0);
    assert!(!nll.is_finite());
    assert_eq!(trace.ensure_finite(), Err(HMMError::DegenerateStep { t: 0, total: 0.0 }));
    for t in 0..2 {
        assert_eq!(trace.filtered_at(t)[[1, 1]], 0.0);
    }
}

#[test]
// Purpose
// -------
// The backward pass is the forward filter on reversed data.
//
// Given
// -----
// - The coastal 5x5 domain, 5 steps with irregular intervals, both
//   boundaries set.
//
// Expect
// ------
// - `backward(...)` equals `forward(reversed, swapped)` exactly.
fn scenario_backward_is_reversed_forward() {
    let domain = coastal_domain();
    let emissions = varied_emissions(5, 5, 5);
    let initial = Array2::from_shape_fn((5, 5), |(i, j)| 1.0 + (i * j) as f64);
    let terminal = Array2::from_shape_fn((5, 5), |(i, j)| 1.0 + (i + 2 * j) as f64);
    let boundaries = BoundaryConditions::new(Some(initial), Some(terminal)).unwrap();
    let params = ModelParams::new(0.9, 3.0).unwrap();

    let bwd = backward(&domain, &emissions, &boundaries, &params, &brownian()).unwrap();
    let rev = forward(&domain, &emissions.reversed(), &boundaries.swapped(), &params, &brownian())
        .unwrap();

    assert_eq!(bwd, rev);
}

#[test]
// Purpose
// -------
// The joint likelihood does not depend on the direction of the pass.
//
// Given
// -----
// - The coastal domain, 6 irregular steps, an initial boundary only.
//
// Expect
// ------
// - `-Σ ln c_t` of the forward and backward constants agree to 1e-10.
// - Every smoothed marginal sums to 1 with zeros on land.
fn score_is_direction_symmetric() {
    let domain = coastal_domain();
    let emissions = varied_emissions(6, 5, 5);
    let boundaries =
        BoundaryConditions::initial(Array2::from_shape_fn((5, 5), |(i, _)| 1.0 + i as f64))
            .unwrap();
    let params = ModelParams::new(1.3, 4.0).unwrap();

    let fwd = forward(&domain, &emissions, &boundaries, &params, &brownian()).unwrap();
    let bwd = backward(&domain, &emissions, &boundaries, &params, &brownian()).unwrap();
    let post = forward_backward(&domain, &emissions, &boundaries, &params, &brownian()).unwrap();

    assert_relative_eq!(
        -fwd.log_likelihood(),
        -bwd.log_likelihood(),
        epsilon = 1e-10,
        max_relative = 1e-10
    );
    for t in 0..emissions.len() {
        let marginal = post.marginal(t);
        assert_relative_eq!(marginal.sum(), 1.0, epsilon = 1e-12);
        assert_eq!(marginal[[0, 4]], 0.0);
        assert_eq!(marginal[[3, 1]], 0.0);
    }
}

#[test]
// Purpose
// -------
// Kernel construction is deterministic, ignores the grid dimensions, and a
// wide cut-off matches no cut-off.
//
// Given
// -----
// - sigma = 1, dt = 2 on the spacing of a 5x5 and of a 1x1 grid.
// - truncate in {8, 10, 0}.
//
// Expect
// ------
// - Building twice, or for either grid, yields identical kernels.
// - truncate = 10 and truncate = 0 give identical kernels.
// - truncate = 8 matches truncate = 0 in marginals within 1e-12.
fn kernel_is_deterministic_and_truncation_converges() {
    let domain = open_domain(5, 5);
    let tiny = open_domain(1, 1);
    let eight = ModelParams::new(1.0, 8.0).unwrap();
    let wide = ModelParams::new(1.0, 10.0).unwrap();
    let full = ModelParams::new(1.0, 0.0).unwrap();
    let build = |params: &ModelParams, grid: &Grid| {
        DiffusionKernel::build(params, grid.spacing, 2.0, TimeScaling::Brownian).unwrap()
    };

    assert_eq!(build(&wide, &domain.grid), build(&wide, &domain.grid));
    assert_eq!(build(&wide, &domain.grid), build(&wide, &tiny.grid));
    assert_eq!(build(&wide, &domain.grid), build(&full, &domain.grid));

    let emissions = varied_emissions(4, 5, 5);
    let none = BoundaryConditions::none();
    let p_eight = forward_backward(&domain, &emissions, &none, &eight, &brownian()).unwrap();
    let p_full = forward_backward(&domain, &emissions, &none, &full, &brownian()).unwrap();
    for (x, y) in p_eight.marginals().iter().zip(p_full.marginals().iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-12);
    }
}

#[test]
// Purpose
// -------
// On a single-cell grid every move off the cell is lost, so the score
// charges the escaped mass instead of hiding it.
//
// Given
// -----
// - An unmasked 1x1 grid, sigma = 1, truncate = 4.
// - Two steps of all-ones emissions.
//
// Expect
// ------
// - `c_0 = 1` and `c_1` equals the stay-put weight
//   `1 / Σ_{k²+l²≤16} e^{-(k²+l²)/2}`.
// - The score is `-ln c_1` (≈ 1.8375).
fn single_cell_grid_scores_escaped_mass() {
    let domain = open_domain(1, 1);
    let emissions = EmissionSequence::new(Array3::ones((2, 1, 1))).unwrap();
    let params = ModelParams::new(1.0, 4.0).unwrap();
    let mut total = 0.0;
    for k in -4_i32..=4 {
        for l in -4_i32..=4 {
            let d2 = (k * k + l * l) as f64;
            if d2 <= 16.0 {
                total += (-0.5 * d2).exp();
            }
        }
    }
    let stay = 1.0 / total;
    let none = BoundaryConditions::none();

    let trace = forward(&domain, &emissions, &none, &params, &brownian()).unwrap();
    let nll = score(&domain, &emissions, &none, &params, &brownian()).unwrap();

    assert_relative_eq!(trace.constants()[0], 1.0, epsilon = 1e-15);
    assert_relative_eq!(trace.constants()[1], stay, epsilon = 1e-15);
    assert_relative_eq!(nll, -stay.ln(), epsilon = 1e-12);
    assert_relative_eq!(nll, 1.8375, epsilon = 1e-4);
}

#[test]
// Purpose
// -------
// Batch and sweep dispatch return exactly what sequential calls return.
//
// Given
// -----
// - Three problems sharing one `Arc<Domain>`, different emissions.
// - A sweep over sigma in {0.5, 1.0, 2.0} on the first problem.
//
// Expect
// ------
// - `score_batch` / `predict_proba_batch` match per-problem calls in order.
// - `score_sweep` matches `with_sigma(s).score(...)` for each candidate.
fn batch_and_sweep_match_sequential_calls() {
    let domain = Arc::new(coastal_domain());
    let batch: ProblemBatch = (3..6)
        .map(|n| TrackingProblem::unconstrained(Arc::clone(&domain), varied_emissions(n, 5, 5)))
        .collect::<Result<_, _>>()
        .unwrap();
    let estimator = RandomWalkEstimator::with_default_options(1.0).unwrap();

    let scores = estimator.score_batch(&batch);
    let probas = estimator.predict_proba_batch(&batch);
    assert_eq!(scores.len(), 3);
    for (i, problem) in batch.iter().enumerate() {
        assert_eq!(scores[i], estimator.score(problem));
        assert_eq!(probas[i], estimator.predict_proba(problem));
    }

    let first = &batch.problems()[0];
    let candidates: Vec<ModelParams> =
        [0.5, 1.0, 2.0].iter().map(|&s| estimator.params().with_sigma(s).unwrap()).collect();
    let swept = estimator.score_sweep(first, &candidates);
    for (sigma, result) in [0.5, 1.0, 2.0].iter().zip(swept) {
        assert_eq!(result, estimator.with_sigma(*sigma).unwrap().score(first));
    }
}

#[test]
// Purpose
// -------
// Profile residuals turned into emissions recover a known track.
//
// Given
// -----
// - A 3x3 reference field whose two levels hold `10 + 3i + j` at cell
//   (i, j); every column reaches 100 m.
// - Three tag profiles reading the values of (0, 0), (0, 1) and (1, 1).
// - Likelihood std 0.2, sigma 1.
//
// Expect
// ------
// - The modal track of the smoothed marginals and the Viterbi path both
//   follow (0, 0) → (0, 1) → (1, 1).
fn emission_pipeline_recovers_track() {
    let values = Array3::from_shape_fn((3, 3, 2), |(i, j, _)| 10.0 + (3 * i + j) as f64);
    let field =
        ReferenceField::new(values, array![0.0, 10.0], Array2::from_elem((3, 3), 100.0)).unwrap();
    let track = [(0usize, 0usize), (0, 1), (1, 1)];
    let profiles: Vec<TagProfile<f64>> = track
        .iter()
        .map(|&(i, j)| {
            let v = 10.0 + (3 * i + j) as f64;
            TagProfile::new(array![v, v], array![0.0, 10.0]).unwrap()
        })
        .collect();

    let residuals = residual_sequence(&field, &profiles, DEFAULT_DEPTH_THRESHOLD);
    let emissions = emission_sequence(residuals.view(), 0.2, None).unwrap();
    let problem =
        TrackingProblem::unconstrained(Arc::new(open_domain(3, 3)), emissions).unwrap();
    let estimator = RandomWalkEstimator::with_default_options(1.0).unwrap();

    let marginals = estimator.predict_proba(&problem).unwrap();
    let modal: Vec<(usize, usize)> =
        modal_track(marginals.view()).into_iter().map(|cell| cell.unwrap()).collect();
    let path = estimator.decode(&problem).unwrap();

    assert_eq!(modal, track.to_vec());
    assert_eq!(path.cells, track.to_vec());
    assert!(path.log_probability.is_finite());
}
