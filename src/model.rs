//! The Emax dose-response model and the top-level fitting entry points.
//!
//! The model maps a non-negative dose to a response that falls from a fixed
//! baseline toward `baseline - max_effect` as dose grows:
//!
//! ```text
//! response = baseline - max_effect * dose / (potency + dose)
//! ```
//!
//! `potency` is the dose producing half the maximal effect; the shape
//! exponent is fixed to 1 and not represented. Only `max_effect` and
//! `potency` are free parameters; the baseline is model configuration.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::descent::GradientDescent;
use crate::error::{EmaxFitError, Result};
use crate::uncertainty::{
    asymptotic_covariance, estimate_covariance, CovarianceMatrix, CovarianceMethod,
    StandardErrors, DEFAULT_FD_STEP,
};

/// The free parameters of the Emax model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaxParameters {
    /// Maximal achievable effect (drop from baseline), non-negative.
    pub max_effect: f64,

    /// Dose at half-maximal effect, strictly positive.
    pub potency: f64,
}

impl EmaxParameters {
    /// Create a new parameter vector.
    pub fn new(max_effect: f64, potency: f64) -> Self {
        Self {
            max_effect,
            potency,
        }
    }

    /// Check that the parameters are usable as a starting point or estimate.
    ///
    /// # Returns
    ///
    /// `Ok(())` for finite values with `max_effect >= 0` and `potency > 0`,
    /// an `InvalidParameter` error otherwise.
    pub fn validate(&self) -> Result<()> {
        if !self.max_effect.is_finite() || !self.potency.is_finite() {
            return Err(EmaxFitError::InvalidParameter(format!(
                "parameters must be finite, got max_effect = {}, potency = {}",
                self.max_effect, self.potency
            )));
        }

        if self.max_effect < 0.0 {
            return Err(EmaxFitError::InvalidParameter(format!(
                "max_effect must be non-negative, got {}",
                self.max_effect
            )));
        }

        if self.potency <= 0.0 {
            return Err(EmaxFitError::InvalidParameter(format!(
                "potency must be positive, got {}",
                self.potency
            )));
        }

        Ok(())
    }
}

/// The Emax model with its fixed baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaxModel {
    /// Response at dose 0, fixed for the whole run.
    pub baseline: f64,
}

impl Default for EmaxModel {
    fn default() -> Self {
        Self { baseline: 100.0 }
    }
}

impl EmaxModel {
    /// Create a model with the given baseline.
    pub fn new(baseline: f64) -> Self {
        Self { baseline }
    }

    /// Evaluate the model at a single dose.
    ///
    /// Defined for `dose >= 0` and `potency > 0`. If `potency + dose` is
    /// exactly zero the baseline is returned, so a degenerate negative
    /// potency fed in by an interactive caller cannot produce a NaN.
    pub fn evaluate(&self, dose: f64, params: &EmaxParameters) -> f64 {
        let denominator = params.potency + dose;
        if denominator == 0.0 {
            return self.baseline;
        }

        self.baseline - params.max_effect * dose / denominator
    }

    /// Evaluate the model across a dose sequence.
    pub fn predict(&self, doses: &Array1<f64>, params: &EmaxParameters) -> Array1<f64> {
        doses.mapv(|dose| self.evaluate(dose, params))
    }

    /// Analytic partial derivatives of the response with respect to the
    /// log-scale parameters, `(d y / d ln max_effect, d y / d ln potency)`.
    ///
    /// These are the sensitivities the expected-information calculation
    /// integrates over a candidate dose list. Zero denominator yields
    /// `(0.0, 0.0)`, matching the evaluator's constant-baseline fallback.
    pub fn log_gradient(&self, dose: f64, params: &EmaxParameters) -> (f64, f64) {
        let denominator = params.potency + dose;
        if denominator == 0.0 {
            return (0.0, 0.0);
        }

        let d_log_max_effect = -(dose / denominator) * params.max_effect;
        let d_log_potency = params.max_effect * dose * params.potency / (denominator * denominator);

        (d_log_max_effect, d_log_potency)
    }
}

/// Result of a complete fit: point estimate plus uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Best-seen parameters within the admissible box.
    pub parameters: EmaxParameters,

    /// Marginal standard errors, `sqrt` of the covariance diagonal.
    pub standard_errors: StandardErrors,

    /// Covariance of (max_effect, potency).
    pub covariance: CovarianceMatrix,

    /// Residual sum of squares at the returned parameters.
    pub rss: f64,

    /// Number of optimizer iterations performed.
    pub iterations: usize,

    /// True when the covariance fell back to a diagonal-only approximation
    /// (degenerate Hessian, or the bootstrap's missing cross term).
    pub diagonal_covariance: bool,
}

/// Fit the model to a dataset with default settings.
///
/// Runs the default bounded gradient descent from `initial`, then the
/// default asymptotic covariance estimate. Entirely deterministic; no
/// random source is needed on this path.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `data` - Validated observations
/// * `initial` - Starting parameters, validated here
///
/// # Returns
///
/// The fit result, or an `InvalidParameter` error for an unusable start.
pub fn fit(model: &EmaxModel, data: &Dataset, initial: &EmaxParameters) -> Result<FitResult> {
    initial.validate()?;

    let optimum = GradientDescent::default().fit(model, data, initial);
    let estimate = asymptotic_covariance(model, data, &optimum.parameters, DEFAULT_FD_STEP);

    Ok(FitResult {
        parameters: optimum.parameters,
        standard_errors: estimate.standard_errors,
        covariance: estimate.covariance,
        rss: optimum.rss,
        iterations: optimum.iterations,
        diagonal_covariance: estimate.diagonal_only,
    })
}

/// Fit the model with explicit optimizer and covariance configuration.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `data` - Validated observations
/// * `initial` - Starting parameters, validated here
/// * `descent` - Optimizer configuration
/// * `method` - Covariance strategy (asymptotic or bootstrap)
/// * `rng` - Uniform random source, used by the bootstrap strategy only
pub fn fit_with(
    model: &EmaxModel,
    data: &Dataset,
    initial: &EmaxParameters,
    descent: &GradientDescent,
    method: &CovarianceMethod,
    rng: &mut impl Rng,
) -> Result<FitResult> {
    initial.validate()?;

    let optimum = descent.fit(model, data, initial);
    let estimate = estimate_covariance(model, data, &optimum.parameters, method, rng)?;

    Ok(FitResult {
        parameters: optimum.parameters,
        standard_errors: estimate.standard_errors,
        covariance: estimate.covariance,
        rss: optimum.rss,
        iterations: optimum.iterations,
        diagonal_covariance: estimate.diagonal_only,
    })
}
