//! Batches of independent tracking problems and their dispatch.
//!
//! Purpose
//! -------
//! Represent "many tagged individuals on one domain" as an explicit
//! collection of self-contained problems, and map a pure per-problem function
//! over it with parallel-map semantics.
//!
//! Key behaviors
//! -------------
//! - [`TrackingProblem`] bundles a shared domain (`Arc<Domain>`), one
//!   emission sequence and its boundary conditions; shapes are validated at
//!   construction.
//! - [`ProblemBatch`] is an ordered list of problems; results come back in
//!   the same order.
//! - [`dispatch`] runs a closure over a slice with rayon's `par_iter` when the
//!   `parallel` feature is on and sequentially otherwise. Results are
//!   identical either way.
//!
//! Invariants & assumptions
//! ------------------------
//! - Problems share nothing mutable; a domain is only ever read.
//! - A failing problem does not affect its neighbours: per-problem results
//!   are returned individually.
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::Domain,
        validation::validate_problem_shapes,
    },
    errors::HMMResult,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// TrackingProblem — one individual's observations on a shared domain.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingProblem {
    pub domain: Arc<Domain>,
    pub emissions: EmissionSequence,
    pub boundaries: BoundaryConditions,
}

impl TrackingProblem {
    /// Bundle and shape-check one problem.
    ///
    /// # Errors
    /// - `HMMError::ShapeMismatch` if a map does not match the domain grid.
    pub fn new(
        domain: Arc<Domain>, emissions: EmissionSequence, boundaries: BoundaryConditions,
    ) -> HMMResult<Self> {
        validate_problem_shapes(&domain, &emissions, &boundaries)?;
        Ok(TrackingProblem { domain, emissions, boundaries })
    }

    /// Problem without boundary constraints.
    pub fn unconstrained(domain: Arc<Domain>, emissions: EmissionSequence) -> HMMResult<Self> {
        TrackingProblem::new(domain, emissions, BoundaryConditions::none())
    }

    /// Number of observation instants.
    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }
}

/// ProblemBatch — ordered collection of independent problems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemBatch {
    problems: Vec<TrackingProblem>,
}

impl ProblemBatch {
    pub fn new(problems: Vec<TrackingProblem>) -> Self {
        ProblemBatch { problems }
    }

    pub fn push(&mut self, problem: TrackingProblem) {
        self.problems.push(problem);
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[TrackingProblem] {
        &self.problems
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackingProblem> {
        self.problems.iter()
    }
}

impl FromIterator<TrackingProblem> for ProblemBatch {
    fn from_iter<I: IntoIterator<Item = TrackingProblem>>(iter: I) -> Self {
        ProblemBatch { problems: iter.into_iter().collect() }
    }
}

/// Map `f` over `items`, preserving order.
pub fn dispatch<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    debug!(n_items = items.len(), parallel = cfg!(feature = "parallel"), "dispatching batch");

    #[cfg(feature = "parallel")]
    {
        items.par_iter().map(f).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items.iter().map(f).collect()
    }
}
