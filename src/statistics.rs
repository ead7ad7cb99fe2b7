//! # Statistics utilities
//!
//! Residual, RMSE, median and norm helpers shared by the fitting procedure,
//! plus the variogram noise estimators that parameterize change detection.
//!
//! The variogram family follows a non-raising contract: with fewer than two
//! usable observations per band the estimate is a NaN sentinel, never an
//! error, and [`variogram_is_valid`] is the explicit guard callers must
//! apply before trusting the values. This keeps the statistics pipeline
//! exception-free and composable.

use nalgebra::{DMatrix, DVector};

use crate::constants::{OrdinalDay, TEMPORAL_CORRELATION_SPAN};

/// Euclidean norm of a vector: `sqrt(sum(v_i^2))`.
pub fn euclidean_norm(v: &DVector<f64>) -> f64 {
    v.norm()
}

/// Sum of squared elements of a vector.
pub fn sum_of_squares(v: &DVector<f64>) -> f64 {
    v.norm_squared()
}

/// Sum of squared elements of each row of a matrix.
///
/// The axis-reduced companion of [`sum_of_squares`]: one value per band of
/// a band-major spectral matrix.
pub fn row_sum_of_squares(m: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(m.nrows(), m.row_iter().map(|row| row.norm_squared()))
}

/// Residuals between observed and predicted values: `actual - predicted`.
pub fn residuals(actual: &DVector<f64>, predicted: &DVector<f64>) -> DVector<f64> {
    actual - predicted
}

/// Root-mean-square error between observed and predicted values.
///
/// Arguments
/// ---------
/// * `actual`: observed values
/// * `predicted`: values predicted by the fitted curve
///
/// Return
/// ------
/// * `(rmse, residuals)`: both are returned because the external fitting
///   routine does not retain them and downstream consolidation needs both.
pub fn rmse(actual: &DVector<f64>, predicted: &DVector<f64>) -> (f64, DVector<f64>) {
    let resid = residuals(actual, predicted);
    let mean_square = resid.norm_squared() / resid.len() as f64;
    (mean_square.sqrt(), resid)
}

/// Order-statistic median.
///
/// Even-length input yields the mean of the two middle elements; empty
/// input yields NaN.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Per-band median of absolute differences at a fixed column lag.
fn lagged_median_diff(observations: &DMatrix<f64>, lag: usize) -> DVector<f64> {
    DVector::from_iterator(
        observations.nrows(),
        observations.row_iter().map(|row| {
            let diffs: Vec<f64> = (0..row.len() - lag)
                .map(|i| (row[i + lag] - row[i]).abs())
                .collect();
            median(&diffs)
        }),
    )
}

/// First-order variogram: per band, the median of absolute differences
/// between temporally consecutive observations.
///
/// A robust noise estimate for each spectral band. Requires at least two
/// observations; otherwise every band's value is the NaN sentinel (no
/// error is raised, see [`variogram_is_valid`]).
///
/// Arguments
/// ---------
/// * `observations`: band-major spectral matrix (bands x acquisitions)
///
/// Return
/// ------
/// * One noise estimate per band
pub fn variogram(observations: &DMatrix<f64>) -> DVector<f64> {
    if observations.ncols() < 2 {
        return DVector::from_element(observations.nrows(), f64::NAN);
    }
    lagged_median_diff(observations, 1)
}

/// Cadence-aware variogram.
///
/// Observations acquired close together in time are strongly correlated,
/// so consecutive differences under-estimate the noise for dense (multi
/// -sensor or daily) records. The pair lag is widened until the median date
/// gap at that lag exceeds the temporal-correlation span (30 days), and the
/// per-band median absolute difference is taken at that lag. When no lag
/// qualifies (short or sparse records) the plain [`variogram`] is returned.
///
/// Fewer than two observations yield the NaN sentinel per band.
///
/// Arguments
/// ---------
/// * `dates`: ordinal acquisition dates, one per matrix column
/// * `observations`: band-major spectral matrix (bands x acquisitions)
///
/// Return
/// ------
/// * One noise estimate per band
pub fn adjusted_variogram(dates: &[OrdinalDay], observations: &DMatrix<f64>) -> DVector<f64> {
    debug_assert_eq!(dates.len(), observations.ncols());

    if observations.ncols() < 2 {
        return DVector::from_element(observations.nrows(), f64::NAN);
    }

    for lag in 1..dates.len() {
        let gaps: Vec<f64> = (0..dates.len() - lag)
            .map(|i| (dates[i + lag] - dates[i]) as f64)
            .collect();
        if median(&gaps) > TEMPORAL_CORRELATION_SPAN as f64 {
            return lagged_median_diff(observations, lag);
        }
    }

    variogram(observations)
}

/// Guard for the variogram sentinels: false when the estimate is empty or
/// any band's value is NaN. Callers must check this before trusting a
/// variogram value.
pub fn variogram_is_valid(v: &DVector<f64>) -> bool {
    !v.is_empty() && v.iter().all(|x| !x.is_nan())
}

#[cfg(test)]
mod test_statistics {
    use super::*;
    use approx::assert_relative_eq;

    fn arange(n: usize) -> DVector<f64> {
        DVector::from_iterator(n, (0..n).map(|i| i as f64))
    }

    #[test]
    fn test_euclidean_norm() {
        assert_relative_eq!(euclidean_norm(&arange(5)), 30.0_f64.sqrt());
    }

    #[test]
    fn test_sum_of_squares() {
        assert_relative_eq!(sum_of_squares(&arange(5)), 30.0);

        // rows 0..5 and 5..10
        let m = DMatrix::from_iterator(5, 2, (0..10).map(|i| i as f64)).transpose();
        let by_row = row_sum_of_squares(&m);
        assert_relative_eq!(by_row[0], 30.0);
        assert_relative_eq!(by_row[1], 255.0);
    }

    #[test]
    fn test_residuals() {
        let actual = arange(5);
        let predicted = actual.add_scalar(1.0);
        let resid = residuals(&actual, &predicted);
        assert!(resid.iter().all(|&r| r == -1.0));
    }

    #[test]
    fn test_rmse() {
        let actual = arange(5);
        let predicted = actual.add_scalar(1.0);
        let (error, resid) = rmse(&actual, &predicted);
        assert_relative_eq!(error, 1.0);
        assert!(resid.iter().all(|&r| r == -1.0));
    }

    #[test]
    fn test_median() {
        assert_relative_eq!(median(&[0.0, 1.0, 2.0, 3.0, 4.0]), 2.0);
        assert_relative_eq!(median(&[1.0, 3.0]), 2.0);
        assert_relative_eq!(median(&[7.0]), 7.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_variogram() {
        // two bands, consecutive diffs of 1 each
        let obs = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(variogram(&obs), DVector::from_vec(vec![1.0, 1.0]));

        // different spacing per band
        let obs = DMatrix::from_row_slice(2, 4, &[1.0, 3.0, 1.0, 3.0, 4.0, 1.0, 4.0, 1.0]);
        assert_eq!(variogram(&obs), DVector::from_vec(vec![2.0, 3.0]));
    }

    #[test]
    fn test_variogram_insufficient_observations() {
        let empty = DMatrix::<f64>::zeros(1, 0);
        assert!(variogram(&empty).iter().all(|x| x.is_nan()));

        let single = DMatrix::from_row_slice(1, 1, &[1.0]);
        assert!(variogram(&single).iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_adjusted_variogram_dense_dates() {
        // daily cadence over a ramp: the lag is widened to 31 days before
        // diffs are taken
        let dates: Vec<i64> = (0..35).collect();
        let row: Vec<f64> = (0..35).map(|i| i as f64).collect();
        let mut values = row.clone();
        values.extend_from_slice(&row);
        let obs = DMatrix::from_row_slice(2, 35, &values);
        assert_eq!(
            adjusted_variogram(&dates, &obs),
            DVector::from_vec(vec![31.0, 31.0])
        );
    }

    #[test]
    fn test_adjusted_variogram_single_sensor() {
        // 16-day spacing, too short to widen the lag: plain variogram
        let dates: Vec<i64> = vec![0, 16];
        let obs = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 6.0, 5.0]);
        assert_eq!(
            adjusted_variogram(&dates, &obs),
            DVector::from_vec(vec![1.0, 1.0])
        );

        // three acquisitions: lag 2 spans 32 days and is used
        let dates: Vec<i64> = vec![0, 16, 32];
        let obs = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 6.0, 5.0, 4.0]);
        assert_eq!(
            adjusted_variogram(&dates, &obs),
            DVector::from_vec(vec![2.0, 2.0])
        );
    }

    #[test]
    fn test_adjusted_variogram_insufficient_observations() {
        let empty = DMatrix::<f64>::zeros(1, 0);
        assert!(adjusted_variogram(&[], &empty).iter().all(|x| x.is_nan()));

        let single = DMatrix::from_row_slice(2, 1, &[1.0, 6.0]);
        assert!(adjusted_variogram(&[0], &single).iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_variogram_is_valid() {
        assert!(!variogram_is_valid(&DVector::from_vec(vec![f64::NAN])));
        assert!(!variogram_is_valid(&DVector::from_vec(vec![
            1.0,
            f64::NAN
        ])));
        assert!(!variogram_is_valid(&DVector::<f64>::zeros(0)));
        assert!(variogram_is_valid(&arange(6)));
    }
}
