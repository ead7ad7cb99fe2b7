//! # Canonical change-model records
//!
//! The fitting loop produces one regression curve per spectral band and per
//! stable segment, using library-native numeric types. This module
//! consolidates those fits into the canonical, serialization-ready
//! [`ChangeModel`] record exchanged with downstream consumers, and supports
//! resuming a prior run through [`resume_from`].

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ccdc_errors::CcdcError;
use crate::constants::{OrdinalDay, NUM_BANDS};

/// Output of fitting one band's regression curve over a segment.
///
/// The fitting routine does not retain residuals or RMSE, so they are
/// carried forward with the model itself instead of being recomputed.
/// Values stay in their nalgebra representation until consolidation.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    /// Regression coefficients, model-order dependent
    pub coefficients: DVector<f64>,
    /// Regression intercept
    pub intercept: f64,
    /// One residual per observation used in the fit
    pub residual: DVector<f64>,
    /// Root-mean-square error of the fit
    pub rmse: f64,
}

/// Portable per-band curve record of a segment.
///
/// Plain scalars and tuples only, independent of any numeric library
/// representation, so the record serializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralModel {
    pub rmse: f64,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Residual/discontinuity size at the segment boundary
    pub magnitude: f64,
}

/// One stable time segment of a pixel, with a detected (or provisional)
/// break and exactly seven per-band curve records in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeModel {
    pub start_day: OrdinalDay,
    pub end_day: OrdinalDay,
    pub break_day: OrdinalDay,
    pub observation_count: u32,
    /// Confidence in `[0, 1]` that the break is a genuine change; zero
    /// marks a speculative, unconfirmed end fit
    pub change_probability: f64,
    /// Integer flag summarizing fit quality and caveats
    pub curve_qa: i32,
    pub blue: SpectralModel,
    pub green: SpectralModel,
    pub red: SpectralModel,
    pub nir: SpectralModel,
    pub swir1: SpectralModel,
    pub swir2: SpectralModel,
    pub thermal: SpectralModel,
}

/// Consolidate per-band fits and segment metadata into a [`ChangeModel`].
///
/// Converts every library-native numeric value into plain portable types
/// and packages the first seven fits in fixed band order (blue, green, red,
/// nir, swir1, swir2, thermal).
///
/// Arguments
/// ---------
/// * `fitted_models`: per-band fits, at least [`NUM_BANDS`] of them
/// * `start_day`, `end_day`, `break_day`: segment boundary dates
/// * `magnitudes`: per-band change magnitudes, at least [`NUM_BANDS`]
/// * `observation_count`: number of observations used for the segment
/// * `change_probability`: break confidence in `[0, 1]`
/// * `curve_qa`: fit-quality flag
///
/// Return
/// ------
/// * The canonical record, or a precondition error when fewer than
///   [`NUM_BANDS`] fits or magnitudes are supplied
#[allow(clippy::too_many_arguments)]
pub fn to_change_model(
    fitted_models: &[FittedModel],
    start_day: OrdinalDay,
    end_day: OrdinalDay,
    break_day: OrdinalDay,
    magnitudes: &[f64],
    observation_count: u32,
    change_probability: f64,
    curve_qa: i32,
) -> Result<ChangeModel, CcdcError> {
    if fitted_models.len() < NUM_BANDS {
        return Err(CcdcError::MissingBandModels {
            expected: NUM_BANDS,
            actual: fitted_models.len(),
        });
    }
    if magnitudes.len() < NUM_BANDS {
        return Err(CcdcError::MissingMagnitudes {
            expected: NUM_BANDS,
            actual: magnitudes.len(),
        });
    }

    let spectral: SmallVec<[SpectralModel; NUM_BANDS]> = fitted_models
        .iter()
        .zip(magnitudes.iter())
        .take(NUM_BANDS)
        .map(|(model, &magnitude)| SpectralModel {
            rmse: model.rmse,
            coefficients: model.coefficients.iter().copied().collect(),
            intercept: model.intercept,
            magnitude,
        })
        .collect();

    let [blue, green, red, nir, swir1, swir2, thermal] =
        spectral
            .into_inner()
            .map_err(|partial| CcdcError::MissingBandModels {
                expected: NUM_BANDS,
                actual: partial.len(),
            })?;

    Ok(ChangeModel {
        start_day,
        end_day,
        break_day,
        observation_count,
        change_probability,
        curve_qa,
        blue,
        green,
        red,
        nir,
        swir1,
        swir2,
        thermal,
    })
}

/// Prepare a prior result sequence for continued processing.
///
/// Sorts the prior segments by start date, then trims every trailing
/// segment whose `change_probability` is zero: speculative end fits that
/// may be superseded once new observations arrive. The scan stops at the
/// most recent confirmed segment: if that segment is the last one, the
/// whole sequence is returned; if every segment is unconfirmed, nothing is.
///
/// The result is always an independent deep copy; mutating it never
/// affects the caller's sequence.
///
/// Arguments
/// ---------
/// * `prior`: previously produced change models, in any order
///
/// Return
/// ------
/// * The deep-copied, start-date-sorted prefix ending at the most recent
///   confirmed segment
pub fn resume_from(prior: &[ChangeModel]) -> Vec<ChangeModel> {
    let mut sorted: Vec<&ChangeModel> = prior.iter().collect();
    sorted.sort_by_key(|model| model.start_day);

    for (idx, model) in sorted.iter().rev().enumerate() {
        if model.change_probability == 0.0 {
            continue;
        }
        let keep = sorted.len() - idx;
        return sorted[..keep].iter().map(|model| (*model).clone()).collect();
    }

    Vec::new()
}

#[cfg(test)]
mod test_change_model {
    use super::*;

    fn fit(rmse: f64) -> FittedModel {
        FittedModel {
            coefficients: DVector::from_vec(vec![0.5, -0.25]),
            intercept: 100.0,
            residual: DVector::from_vec(vec![1.0, -1.0, 0.0]),
            rmse,
        }
    }

    fn segment(start_day: OrdinalDay, change_probability: f64) -> ChangeModel {
        let fits: Vec<FittedModel> = (0..7).map(|i| fit(i as f64)).collect();
        let magnitudes = [0.0; 7];
        to_change_model(
            &fits,
            start_day,
            start_day + 365,
            start_day + 366,
            &magnitudes,
            40,
            change_probability,
            8,
        )
        .unwrap()
    }

    #[test]
    fn test_to_change_model_band_order() {
        let fits: Vec<FittedModel> = (0..7).map(|i| fit(i as f64)).collect();
        let magnitudes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let model =
            to_change_model(&fits, 700000, 700365, 700366, &magnitudes, 42, 1.0, 8).unwrap();

        assert_eq!(model.start_day, 700000);
        assert_eq!(model.end_day, 700365);
        assert_eq!(model.break_day, 700366);
        assert_eq!(model.observation_count, 42);
        assert_eq!(model.change_probability, 1.0);
        assert_eq!(model.curve_qa, 8);

        assert_eq!(model.blue.rmse, 0.0);
        assert_eq!(model.green.rmse, 1.0);
        assert_eq!(model.thermal.rmse, 6.0);
        assert_eq!(model.blue.magnitude, 10.0);
        assert_eq!(model.thermal.magnitude, 16.0);
        assert_eq!(model.red.coefficients, vec![0.5, -0.25]);
        assert_eq!(model.nir.intercept, 100.0);
    }

    #[test]
    fn test_to_change_model_too_few_bands() {
        let fits: Vec<FittedModel> = (0..6).map(|i| fit(i as f64)).collect();
        let magnitudes = [0.0; 7];
        assert_eq!(
            to_change_model(&fits, 0, 1, 2, &magnitudes, 0, 0.0, 0),
            Err(CcdcError::MissingBandModels {
                expected: 7,
                actual: 6
            })
        );

        let fits: Vec<FittedModel> = (0..7).map(|i| fit(i as f64)).collect();
        assert_eq!(
            to_change_model(&fits, 0, 1, 2, &[0.0; 3], 0, 0.0, 0),
            Err(CcdcError::MissingMagnitudes {
                expected: 7,
                actual: 3
            })
        );
    }

    #[test]
    fn test_to_change_model_extra_fits_ignored() {
        let fits: Vec<FittedModel> = (0..9).map(|i| fit(i as f64)).collect();
        let magnitudes = [0.0; 9];
        let model = to_change_model(&fits, 0, 1, 2, &magnitudes, 0, 0.0, 0).unwrap();
        assert_eq!(model.thermal.rmse, 6.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let model = segment(700000, 0.5);
        let json = serde_json::to_string(&model).unwrap();
        let back: ChangeModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);

        // the canonical keys are present by their band names
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "start_day",
            "end_day",
            "break_day",
            "observation_count",
            "change_probability",
            "curve_qa",
            "blue",
            "green",
            "red",
            "nir",
            "swir1",
            "swir2",
            "thermal",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_resume_from_trims_trailing_end_fits() {
        let prior = vec![
            segment(100, 1.0),
            segment(200, 0.8),
            segment(300, 0.0),
            segment(400, 0.0),
        ];
        let resumed = resume_from(&prior);
        assert_eq!(resumed.len(), 2);
        assert_eq!(resumed[0].start_day, 100);
        assert_eq!(resumed[1].start_day, 200);
    }

    #[test]
    fn test_resume_from_confirmed_tail_keeps_all() {
        let prior = vec![segment(300, 1.0), segment(100, 0.0), segment(200, 1.0)];
        let resumed = resume_from(&prior);
        // sorted by start date, and the embedded end fit is not trailing
        assert_eq!(
            resumed.iter().map(|m| m.start_day).collect::<Vec<_>>(),
            vec![100, 200, 300]
        );
    }

    #[test]
    fn test_resume_from_all_end_fits() {
        let prior = vec![segment(100, 0.0), segment(200, 0.0)];
        assert!(resume_from(&prior).is_empty());
    }

    #[test]
    fn test_resume_from_single_trailing_end_fit() {
        let prior = vec![segment(100, 1.0), segment(200, 1.0), segment(300, 0.0)];
        let resumed = resume_from(&prior);
        assert_eq!(
            resumed.iter().map(|m| m.start_day).collect::<Vec<_>>(),
            vec![100, 200]
        );
    }

    #[test]
    fn test_resume_from_is_independent_copy() {
        let prior = vec![segment(100, 1.0)];
        let mut resumed = resume_from(&prior);
        resumed[0].blue.coefficients[0] = 999.0;
        assert_eq!(prior[0].blue.coefficients[0], 0.5);
    }
}
