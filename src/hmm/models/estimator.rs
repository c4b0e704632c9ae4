//! Random-walk estimator façade.
//!
//! [`RandomWalkEstimator`] owns one immutable `(ModelParams, FilterOptions)`
//! pair and exposes the filters as methods over [`TrackingProblem`]s:
//! smoothed marginals (`predict_proba`), scalar scores (`score`), the raw
//! forward trace (`forward`) and the most probable path (`decode`). Batch
//! variants dispatch the same per-problem functions over a [`ProblemBatch`];
//! `score_sweep` scores one problem under many parameter sets.
//!
//! Changing a parameter builds a new estimator (`with_sigma`, `with_truncate`,
//! `with_params`), so estimators can be shared freely between threads during
//! a sweep.
use crate::hmm::{
    core::{options::FilterOptions, params::ModelParams},
    errors::HMMResult,
    filter::{
        decode::{ViterbiPath, viterbi},
        forward::{FilterTrace, forward},
        score::score,
        smoother::{Posterior, forward_backward},
    },
    models::batch::{ProblemBatch, TrackingProblem, dispatch},
};
use ndarray::Array3;

/// RandomWalkEstimator — Gaussian random-walk HMM over a gridded domain.
///
/// Fields
/// ------
/// - `params`: [`ModelParams`] `(sigma, truncate)`.
/// - `options`: [`FilterOptions`] (time scaling).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkEstimator {
    params: ModelParams,
    options: FilterOptions,
}

impl RandomWalkEstimator {
    pub fn new(params: ModelParams, options: FilterOptions) -> Self {
        RandomWalkEstimator { params, options }
    }

    /// Estimator with default options and the default truncation.
    ///
    /// # Errors
    /// - `HMMError::InvalidSigma` for a NaN `sigma`.
    pub fn with_default_options(sigma: f64) -> HMMResult<Self> {
        Ok(RandomWalkEstimator::new(
            ModelParams::with_default_truncate(sigma)?,
            FilterOptions::default(),
        ))
    }

    pub fn params(&self) -> ModelParams {
        self.params
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// New estimator with `params` and the same options.
    pub fn with_params(&self, params: ModelParams) -> Self {
        RandomWalkEstimator { params, options: self.options }
    }

    /// New estimator with `sigma` replaced.
    pub fn with_sigma(&self, sigma: f64) -> HMMResult<Self> {
        Ok(self.with_params(self.params.with_sigma(sigma)?))
    }

    /// New estimator with `truncate` replaced.
    pub fn with_truncate(&self, truncate: f64) -> HMMResult<Self> {
        Ok(self.with_params(self.params.with_truncate(truncate)?))
    }

    /// Forward trace for one problem.
    pub fn forward(&self, problem: &TrackingProblem) -> HMMResult<FilterTrace> {
        forward(&problem.domain, &problem.emissions, &problem.boundaries, &self.params, &self.options)
    }

    /// Smoothed marginals together with the forward constants.
    pub fn posterior(&self, problem: &TrackingProblem) -> HMMResult<Posterior> {
        forward_backward(
            &problem.domain,
            &problem.emissions,
            &problem.boundaries,
            &self.params,
            &self.options,
        )
    }

    /// Smoothed marginals `(n, rows, cols)` for one problem.
    pub fn predict_proba(&self, problem: &TrackingProblem) -> HMMResult<Array3<f64>> {
        Ok(self.posterior(problem)?.into_marginals())
    }

    /// Negative log-likelihood of one problem.
    pub fn score(&self, problem: &TrackingProblem) -> HMMResult<f64> {
        score(&problem.domain, &problem.emissions, &problem.boundaries, &self.params, &self.options)
    }

    /// Most probable cell path of one problem.
    pub fn decode(&self, problem: &TrackingProblem) -> HMMResult<ViterbiPath> {
        viterbi(&problem.domain, &problem.emissions, &problem.boundaries, &self.params, &self.options)
    }

    /// `predict_proba` for every problem of `batch`, in order.
    pub fn predict_proba_batch(&self, batch: &ProblemBatch) -> Vec<HMMResult<Array3<f64>>> {
        dispatch(batch.problems(), |problem| self.predict_proba(problem))
    }

    /// `score` for every problem of `batch`, in order.
    pub fn score_batch(&self, batch: &ProblemBatch) -> Vec<HMMResult<f64>> {
        dispatch(batch.problems(), |problem| self.score(problem))
    }

    /// Score `problem` under each parameter set (options unchanged).
    pub fn score_sweep(
        &self, problem: &TrackingProblem, candidates: &[ModelParams],
    ) -> Vec<HMMResult<f64>> {
        dispatch(candidates, |params| self.with_params(*params).score(problem))
    }
}
