//! Scorer — negative log-likelihood of one emission sequence.
//!
//! `score = -Σ ln c_t` over the forward constants. It is the quantity an
//! external optimizer minimizes over `sigma`; lower is better. A degenerate
//! step makes the score non-finite (`+∞` for a zero constant, NaN once NaN has
//! propagated) instead of raising, so parameter sweeps keep going.
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::Domain,
        options::FilterOptions,
        params::ModelParams,
    },
    errors::HMMResult,
    filter::forward::forward,
};
use ndarray::ArrayView1;

/// `-Σ ln c_t` for a sequence of normalization constants.
pub fn score_constants(constants: ArrayView1<f64>) -> f64 {
    -constants.iter().map(|c| c.ln()).sum::<f64>()
}

/// Run the forward filter once and reduce its constants to a score.
///
/// # Errors
/// - Shape and parameter errors from [`forward`].
pub fn score(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
    params: &ModelParams, options: &FilterOptions,
) -> HMMResult<f64> {
    let trace = forward(domain, emissions, boundaries, params, options)?;
    Ok(score_constants(trace.constants().view()))
}
