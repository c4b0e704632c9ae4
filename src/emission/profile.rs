//! Depth-matching residual between a tag's observed profile and a reference
//! water column.
//!
//! Purpose
//! -------
//! Reduce "how well does this tag profile fit the reference column at this
//! cell" to one scalar. For every observed sample with a known depth, the
//! reference sample at the nearest depth is found and the difference
//! `observed − |reference|` is taken; the statistic is the mean of those
//! differences.
//!
//! Key behaviors
//! -------------
//! - [`profile_residual`] evaluates the statistic for one column. It is generic
//!   over the float width (`f32` / `f64`) through `num_traits::Float`.
//! - [`residual_field`] evaluates it for every cell of a [`ReferenceField`];
//!   [`residual_sequence`] stacks the fields of several profiles over time.
//!
//! Undefined results (NaN)
//! -----------------------
//! - Depth gate: with a nonzero `depth_threshold`, a column whose `bottom` is
//!   shallower than `threshold × deepest observed depth` cannot explain the
//!   profile.
//! - No reference sample with both a value and a depth.
//! - No observed sample with both a depth and a value.
//!
//! Conventions
//! -----------
//! - Reference depths are compared by absolute value (sign conventions for
//!   depth differ between products); observed depths are used as given.
//! - Ties in depth distance resolve to the first reference sample.
//! - The default threshold is [`DEFAULT_DEPTH_THRESHOLD`]; `0` disables the
//!   gate.
use crate::emission::errors::{EmissionError, EmissionResult};
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis, Zip};
use num_traits::Float;

/// Default fraction of the deepest observation the bottom must reach.
pub const DEFAULT_DEPTH_THRESHOLD: f64 = 0.8;

/// ReferenceField — gridded reference water columns.
///
/// Fields
/// ------
/// - `values`: `(rows, cols, levels)` reference values (e.g. temperature).
/// - `depths`: `(levels,)` depth of each level.
/// - `bottom`: `(rows, cols)` sea-floor depth of each column.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceField<F> {
    values: Array3<F>,
    depths: Array1<F>,
    bottom: Array2<F>,
}

impl<F: Float> ReferenceField<F> {
    /// # Errors
    /// - `EmissionError::ShapeMismatch` if `depths` does not have one entry per
    ///   level or `bottom` is not `(rows, cols)`.
    pub fn new(values: Array3<F>, depths: Array1<F>, bottom: Array2<F>) -> EmissionResult<Self> {
        let (rows, cols, levels) = values.dim();
        if depths.len() != levels {
            return Err(EmissionError::ShapeMismatch {
                what: "depths",
                expected: vec![levels],
                actual: vec![depths.len()],
            });
        }
        if bottom.dim() != (rows, cols) {
            return Err(EmissionError::ShapeMismatch {
                what: "bottom",
                expected: vec![rows, cols],
                actual: bottom.shape().to_vec(),
            });
        }
        Ok(ReferenceField { values, depths, bottom })
    }

    /// `(rows, cols)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.values.dim();
        (rows, cols)
    }

    pub fn values(&self) -> &Array3<F> {
        &self.values
    }

    pub fn depths(&self) -> &Array1<F> {
        &self.depths
    }

    pub fn bottom(&self) -> &Array2<F> {
        &self.bottom
    }
}

/// TagProfile — one observed profile (values at depths).
#[derive(Debug, Clone, PartialEq)]
pub struct TagProfile<F> {
    values: Array1<F>,
    depths: Array1<F>,
}

impl<F: Float> TagProfile<F> {
    /// # Errors
    /// - `EmissionError::EmptyProfile` for zero samples.
    /// - `EmissionError::ShapeMismatch` if the two arrays differ in length.
    pub fn new(values: Array1<F>, depths: Array1<F>) -> EmissionResult<Self> {
        check_pair("observed profile", values.view(), depths.view())?;
        if values.is_empty() {
            return Err(EmissionError::EmptyProfile);
        }
        Ok(TagProfile { values, depths })
    }

    pub fn values(&self) -> &Array1<F> {
        &self.values
    }

    pub fn depths(&self) -> &Array1<F> {
        &self.depths
    }
}

fn check_pair<F>(what: &'static str, a: ArrayView1<F>, b: ArrayView1<F>) -> EmissionResult<()> {
    if a.len() != b.len() {
        return Err(EmissionError::ShapeMismatch {
            what,
            expected: vec![a.len()],
            actual: vec![b.len()],
        });
    }
    Ok(())
}

/// Mean nearest-depth residual of one reference column.
///
/// Returns NaN for the undefined cases listed in the module docs.
///
/// # Errors
/// - `EmissionError::ShapeMismatch` for paired arrays of different lengths.
/// - `EmissionError::EmptyProfile` if the observed profile has no samples.
pub fn profile_residual<F: Float>(
    ref_values: ArrayView1<F>, ref_depths: ArrayView1<F>, bottom: F, obs_values: ArrayView1<F>,
    obs_depths: ArrayView1<F>, depth_threshold: F,
) -> EmissionResult<F> {
    check_pair("reference column", ref_values, ref_depths)?;
    check_pair("observed profile", obs_values, obs_depths)?;
    if obs_depths.is_empty() {
        return Err(EmissionError::EmptyProfile);
    }
    let deepest = nan_max(obs_depths);
    Ok(column_residual(ref_values, ref_depths, bottom, obs_values, obs_depths, deepest, depth_threshold))
}

/// Residual for every cell of `field`, shape `(rows, cols)`.
pub fn residual_field<F: Float>(
    field: &ReferenceField<F>, profile: &TagProfile<F>, depth_threshold: F,
) -> Array2<F> {
    let deepest = nan_max(profile.depths.view());
    Zip::from(field.values.lanes(Axis(2))).and(&field.bottom).map_collect(|column, &bottom| {
        column_residual(
            column,
            field.depths.view(),
            bottom,
            profile.values.view(),
            profile.depths.view(),
            deepest,
            depth_threshold,
        )
    })
}

/// Residual fields of several profiles, shape `(n_profiles, rows, cols)`.
pub fn residual_sequence<F: Float>(
    field: &ReferenceField<F>, profiles: &[TagProfile<F>], depth_threshold: F,
) -> Array3<F> {
    let (rows, cols) = field.grid_shape();
    let mut out = Array3::from_elem((profiles.len(), rows, cols), F::nan());
    for (mut slot, profile) in out.outer_iter_mut().zip(profiles) {
        slot.assign(&residual_field(field, profile, depth_threshold));
    }
    out
}

/// Largest non-NaN entry (NaN if there is none).
fn nan_max<F: Float>(values: ArrayView1<F>) -> F {
    values.iter().filter(|v| !v.is_nan()).fold(F::nan(), |acc, &v| acc.max(v))
}

fn column_residual<F: Float>(
    ref_values: ArrayView1<F>, ref_depths: ArrayView1<F>, bottom: F, obs_values: ArrayView1<F>,
    obs_depths: ArrayView1<F>, deepest: F, depth_threshold: F,
) -> F {
    if depth_threshold != F::zero() && bottom < deepest * depth_threshold {
        return F::nan();
    }

    let reference: Vec<(F, F)> = ref_depths
        .iter()
        .zip(ref_values.iter())
        .filter(|(d, v)| !d.is_nan() && !v.is_nan())
        .map(|(&d, &v)| (d.abs(), v))
        .collect();
    if reference.is_empty() {
        return F::nan();
    }

    let mut sum = F::zero();
    let mut count = 0usize;
    for (&depth, &value) in obs_depths.iter().zip(obs_values.iter()) {
        if depth.is_nan() {
            continue;
        }
        let mut best = reference[0];
        let mut best_dist = (best.0 - depth).abs();
        for &sample in &reference[1..] {
            let dist = (sample.0 - depth).abs();
            if dist < best_dist {
                best = sample;
                best_dist = dist;
            }
        }
        let diff = value - best.1.abs();
        if !diff.is_nan() {
            sum = sum + diff;
            count += 1;
        }
    }

    match F::from(count) {
        Some(n) if count > 0 => sum / n,
        _ => F::nan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The nearest-depth match, absolute reference values and the mean.
    // - The depth gate and its `0` sentinel.
    // - NaN handling on both sides and the empty/mismatch errors.
    // - The same routine at f32 and f64 width.
    // - Field evaluation over a small grid.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Each observation is matched to the reference level nearest in depth.
    //
    // Given
    // -----
    // - Reference levels at depths -10, -50, -100 (negative convention) with
    //   values 20, 15, -10.
    // - Observations 21 at 12 m and 12 at 90 m; bottom 200.
    //
    // Expect
    // ------
    // - (21 − 20 + 12 − |−10|) / 2 = 1.5.
    fn nearest_depth_mean_residual() {
        let r = profile_residual(
            array![20.0, 15.0, -10.0].view(),
            array![-10.0, -50.0, -100.0].view(),
            200.0,
            array![21.0, 12.0].view(),
            array![12.0, 90.0].view(),
            0.8,
        )
        .unwrap();

        assert_relative_eq!(r, 1.5);
    }

    #[test]
    // Purpose
    // -------
    // The depth gate rejects shallow columns unless it is disabled.
    //
    // Given
    // -----
    // - Deepest observation 100 m, bottom 70 m.
    //
    // Expect
    // ------
    // - NaN with threshold 0.8 (70 < 80); finite with threshold 0.
    fn depth_gate_and_sentinel() {
        let (ref_values, ref_depths) = (array![10.0], array![5.0]);
        let (obs_values, obs_depths) = (array![11.0, 12.0], array![100.0, f64::NAN]);
        let residual = |threshold: f64| {
            profile_residual(
                ref_values.view(),
                ref_depths.view(),
                70.0,
                obs_values.view(),
                obs_depths.view(),
                threshold,
            )
            .unwrap()
        };

        let gated = residual(0.8);
        let open = residual(0.0);

        assert!(gated.is_nan());
        assert_relative_eq!(open, 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Missing data never poisons the statistic.
    //
    // Given
    // -----
    // - A reference level with NaN value; an observation with NaN value; an
    //   all-NaN reference column.
    //
    // Expect
    // ------
    // - The NaN level is skipped and the NaN observation dropped.
    // - The all-NaN column gives NaN.
    fn missing_samples_are_skipped() {
        let r = profile_residual(
            array![f64::NAN, 8.0].view(),
            array![10.0, 30.0].view(),
            500.0,
            array![10.0, f64::NAN].view(),
            array![10.0, 30.0].view(),
            0.8,
        )
        .unwrap();
        assert_relative_eq!(r, 2.0);

        let empty = profile_residual(
            array![f64::NAN].view(),
            array![10.0].view(),
            500.0,
            array![10.0].view(),
            array![10.0].view(),
            0.8,
        )
        .unwrap();
        assert!(empty.is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Malformed inputs are errors, not NaN.
    //
    // Given
    // -----
    // - A reference column with 2 values and 1 depth; an empty profile.
    //
    // Expect
    // ------
    // - `ShapeMismatch` and `EmptyProfile`.
    fn malformed_inputs_error() {
        let err = profile_residual(
            array![1.0, 2.0].view(),
            array![1.0].view(),
            10.0,
            array![1.0].view(),
            array![1.0].view(),
            0.8,
        )
        .unwrap_err();
        assert!(matches!(err, EmissionError::ShapeMismatch { what: "reference column", .. }));

        let empty: Array1<f64> = Array1::zeros(0);
        assert_eq!(TagProfile::new(empty.clone(), empty), Err(EmissionError::EmptyProfile));
    }

    #[test]
    // Purpose
    // -------
    // The routine is generic over float width.
    //
    // Given
    // -----
    // - The first test's inputs in f32.
    //
    // Expect
    // ------
    // - 1.5 in f32.
    fn works_in_single_precision() {
        let r: f32 = profile_residual(
            array![20.0f32, 15.0, -10.0].view(),
            array![-10.0f32, -50.0, -100.0].view(),
            200.0,
            array![21.0f32, 12.0].view(),
            array![12.0f32, 90.0].view(),
            0.8,
        )
        .unwrap();

        assert_relative_eq!(r, 1.5f32);
    }

    #[test]
    // Purpose
    // -------
    // Field evaluation applies the column rule cell by cell.
    //
    // Given
    // -----
    // - A 1x2 field with one level at 10 m: values 5 and 7; bottoms 100 and 5.
    // - Observation 6 at 10 m.
    //
    // Expect
    // ------
    // - [[1, NaN]] (second column fails the depth gate); stacking two
    //   profiles gives shape (2, 1, 2).
    fn field_residuals_per_cell() {
        let field = ReferenceField::new(
            Array3::from_shape_vec((1, 2, 1), vec![5.0, 7.0]).unwrap(),
            array![10.0],
            array![[100.0, 5.0]],
        )
        .unwrap();
        let profile = TagProfile::new(array![6.0], array![10.0]).unwrap();

        let r = residual_field(&field, &profile, DEFAULT_DEPTH_THRESHOLD);
        let stacked = residual_sequence(&field, &[profile.clone(), profile], 0.8);

        assert_relative_eq!(r[[0, 0]], 1.0);
        assert!(r[[0, 1]].is_nan());
        assert_eq!(stacked.dim(), (2, 1, 2));
        assert_relative_eq!(stacked[[1, 0, 0]], 1.0);
    }
}
