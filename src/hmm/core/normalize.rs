//! Masked normalization — turn a nonnegative map into a distribution over
//! the valid cells and report the mass it had.
//!
//! Purpose
//! -------
//! Every filter step ends here: invalid cells are zeroed, the remaining mass
//! is measured, and the map is rescaled to sum to 1. The measured mass is the
//! step's normalization constant (its local marginal likelihood), which the
//! scorer aggregates.
//!
//! Degenerate steps
//! ----------------
//! A total of zero (or a non-finite total) means no valid cell can explain
//! the observation. The valid cells are then set to NaN and the raw total is
//! returned unchanged, so a zero total scores `+∞` and a NaN total scores NaN.
//! Invalid cells stay exactly 0 in every case.
use crate::hmm::core::grid::Mask;
use ndarray::{Array2, Zip};

/// Whether a normalization constant marks a degenerate step.
#[inline]
pub fn is_degenerate(total: f64) -> bool {
    !(total.is_finite() && total > 0.0)
}

/// Normalize `map` in place over the valid cells of `mask` and return the
/// pre-normalization total.
///
/// `map` must have the mask's shape.
pub fn normalize(map: &mut Array2<f64>, mask: &Mask) -> f64 {
    debug_assert_eq!(map.dim(), mask.shape());
    let valid = mask.as_array();

    let mut total = 0.0;
    Zip::from(&mut *map).and(valid).for_each(|v, &ok| {
        if ok {
            total += *v;
        } else {
            *v = 0.0;
        }
    });

    if is_degenerate(total) {
        Zip::from(map).and(valid).for_each(|v, &ok| {
            if ok {
                *v = f64::NAN;
            }
        });
        return total;
    }

    Zip::from(map).and(valid).for_each(|v, &ok| {
        if ok {
            *v /= total;
        }
    });
    total
}

/// Normalized copy of `map`.
pub fn normalized(map: &Array2<f64>, mask: &Mask) -> (Array2<f64>, f64) {
    let mut out = map.clone();
    let total = normalize(&mut out, mask);
    (out, total)
}
