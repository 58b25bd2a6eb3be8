//! Expected Fisher information and pre-data design evaluation.
//!
//! Given a candidate dose list and hypothesized parameters, the expected
//! information `I = (1/sigma^2) * sum over doses of g g^T` (with `g` the
//! log-scale sensitivity of the response) predicts how precisely a study
//! run at that design could estimate the parameters, before any data
//! exist. Its inverse is the log-scale covariance; the delta method maps
//! it to the natural scale, and the percent relative standard error per
//! parameter grades the design against a fixed threshold.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{EmaxFitError, Result};
use crate::model::{EmaxModel, EmaxParameters};
use crate::uncertainty::CovarianceMatrix;

/// %RSE above which a design is graded poor, per parameter.
pub const RSE_THRESHOLD: f64 = 50.0;

/// Documented default for the assumed noise level (typical range 3-7).
pub const DEFAULT_ASSUMED_NOISE_SD: f64 = 5.0;

/// Relative determinant floor below which the information matrix is
/// treated as singular. Replicated-dose designs produce exactly
/// proportional sensitivity vectors, so their determinant is zero up to
/// rounding; the relative guard catches both.
const SINGULAR_REL_TOL: f64 = 1e-12;

/// Precision forecast for a candidate dosing design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignReport {
    /// %RSE of max_effect; infinite when the design is singular.
    pub rse_max_effect: f64,

    /// %RSE of potency; infinite when the design is singular.
    pub rse_potency: f64,

    /// Natural-scale covariance forecast (delta method); zero when singular.
    pub covariance: CovarianceMatrix,

    /// True when the expected information matrix is singular or
    /// numerically indistinguishable from singular.
    pub singular: bool,

    /// True when the design is usable: non-singular with both %RSE values
    /// at or below [`RSE_THRESHOLD`].
    pub adequate: bool,
}

/// Expected information matrix on the log-parameter scale.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `doses` - Candidate dose list
/// * `assumed` - Hypothesized parameters the sensitivities are taken at
/// * `noise_sd` - Assumed residual noise level
///
/// # Returns
///
/// The 2x2 matrix `(1/sigma^2) * sum of g g^T`, ordered
/// (log max_effect, log potency).
pub fn expected_information(
    model: &EmaxModel,
    doses: &Array1<f64>,
    assumed: &EmaxParameters,
    noise_sd: f64,
) -> Array2<f64> {
    let mut information = Array2::<f64>::zeros((2, 2));

    for &dose in doses.iter() {
        let (g_max_effect, g_potency) = model.log_gradient(dose, assumed);

        information[[0, 0]] += g_max_effect * g_max_effect;
        information[[0, 1]] += g_max_effect * g_potency;
        information[[1, 1]] += g_potency * g_potency;
    }

    information[[1, 0]] = information[[0, 1]];
    information /= noise_sd * noise_sd;

    information
}

/// Grade a candidate design before any data exist.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `doses` - Candidate dose list; non-empty, finite, non-negative
/// * `assumed` - Hypothesized parameters, validated here
/// * `noise_sd` - Assumed residual noise level, strictly positive
///
/// # Returns
///
/// The design report. Input problems are errors; a singular information
/// matrix is not an error. Singular designs come back as poor, with
/// infinite %RSE values, so a caller can always render the verdict.
pub fn evaluate_design(
    model: &EmaxModel,
    doses: &Array1<f64>,
    assumed: &EmaxParameters,
    noise_sd: f64,
) -> Result<DesignReport> {
    assumed.validate()?;

    if doses.is_empty() {
        return Err(EmaxFitError::InvalidInput(
            "design evaluation requires at least one dose".to_string(),
        ));
    }
    for (i, &dose) in doses.iter().enumerate() {
        if !dose.is_finite() {
            return Err(EmaxFitError::InvalidInput(format!(
                "dose at index {} is not finite",
                i
            )));
        }
        if dose < 0.0 {
            return Err(EmaxFitError::InvalidInput(format!(
                "dose at index {} is negative: {}",
                i, dose
            )));
        }
    }
    if !noise_sd.is_finite() || noise_sd <= 0.0 {
        return Err(EmaxFitError::InvalidInput(format!(
            "assumed noise sd must be positive and finite, got {}",
            noise_sd
        )));
    }

    let information = expected_information(model, doses, assumed, noise_sd);
    let i_max_effect = information[[0, 0]];
    let i_potency = information[[1, 1]];
    let i_cross = information[[0, 1]];

    // The diagonal entries are sums of squares, so the relative guard also
    // catches every non-positive determinant.
    let determinant = i_max_effect * i_potency - i_cross * i_cross;
    if determinant <= SINGULAR_REL_TOL * i_max_effect * i_potency {
        return Ok(DesignReport {
            rse_max_effect: f64::INFINITY,
            rse_potency: f64::INFINITY,
            covariance: CovarianceMatrix::zero(),
            singular: true,
            adequate: false,
        });
    }

    // Log-scale covariance from the closed-form 2x2 inverse.
    let var_log_max_effect = i_potency / determinant;
    let var_log_potency = i_max_effect / determinant;
    let cov_log = -i_cross / determinant;

    // Delta method to the natural scale: var = param^2 * var_log, and the
    // cross term picks up one factor of each parameter.
    let covariance = CovarianceMatrix::new(
        assumed.max_effect * assumed.max_effect * var_log_max_effect,
        assumed.potency * assumed.potency * var_log_potency,
        assumed.max_effect * assumed.potency * cov_log,
    );

    // %RSE = 100 * sqrt(var) / estimate, which on the log scale reduces to
    // 100 * sqrt(var_log).
    let rse_max_effect = 100.0 * var_log_max_effect.sqrt();
    let rse_potency = 100.0 * var_log_potency.sqrt();

    let adequate = rse_max_effect <= RSE_THRESHOLD && rse_potency <= RSE_THRESHOLD;

    Ok(DesignReport {
        rse_max_effect,
        rse_potency,
        covariance,
        singular: false,
        adequate,
    })
}
