//! Predict step — propagate a distribution through one diffusion interval.
//!
//! The prediction is the zero-padded 2D convolution of the previous
//! (normalized) map with a [`DiffusionKernel`]. Mass that the kernel would
//! move past the grid edge is lost, so the result can sum to less than 1; the
//! following masked normalization absorbs that loss into the step constant.
//!
//! The kernel is symmetric, so scattering each source cell's mass over its
//! neighborhood is the same operation as the textbook gather form. Exact zeros
//! in the input are skipped, which keeps sparse maps (e.g. right after a
//! delta observation) cheap. NaN inputs are not skipped and propagate into
//! every cell they reach.
use crate::hmm::core::kernel::DiffusionKernel;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// Convolve `prev` with `kernel` into a freshly allocated map.
pub fn predict(prev: ArrayView2<f64>, kernel: &DiffusionKernel) -> Array2<f64> {
    let mut out = Array2::zeros(prev.dim());
    predict_into(prev, kernel, out.view_mut());
    out
}

/// Convolve `prev` with `kernel`, overwriting `out`.
///
/// `out` must have the shape of `prev`.
pub fn predict_into(prev: ArrayView2<f64>, kernel: &DiffusionKernel, mut out: ArrayViewMut2<f64>) {
    debug_assert_eq!(prev.dim(), out.dim());
    out.fill(0.0);

    let (rows, cols) = prev.dim();
    let (ry, rx) = kernel.radius();
    let weights = kernel.weights();

    for ((i, j), &mass) in prev.indexed_iter() {
        if mass == 0.0 {
            continue;
        }
        // Target rows/cols covered by the stencil, clipped to the grid.
        let r_lo = i.saturating_sub(ry);
        let r_hi = (i + ry).min(rows - 1);
        let c_lo = j.saturating_sub(rx);
        let c_hi = (j + rx).min(cols - 1);
        for r in r_lo..=r_hi {
            let a = r + ry - i;
            for c in c_lo..=c_hi {
                let w = weights[[a, c + rx - j]];
                if w != 0.0 {
                    out[[r, c]] += mass * w;
                }
            }
        }
    }
}
