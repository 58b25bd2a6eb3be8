//! Residual sum of squares, the optimization loss and goodness-of-fit
//! diagnostic.

use ndarray::Array1;

use crate::data::Dataset;
use crate::error::{EmaxFitError, Result};
use crate::model::{EmaxModel, EmaxParameters};

/// Residual sum of squares between observed and predicted sequences.
///
/// # Arguments
///
/// * `observed` - Measured responses
/// * `predicted` - Model predictions, same length
///
/// # Returns
///
/// `Sum((observed_i - predicted_i)^2)`, or a `DimensionMismatch` error when
/// the lengths disagree.
pub fn rss(observed: &Array1<f64>, predicted: &Array1<f64>) -> Result<f64> {
    if observed.len() != predicted.len() {
        return Err(EmaxFitError::DimensionMismatch(format!(
            "expected {} predictions to match observations, got {}",
            observed.len(),
            predicted.len()
        )));
    }

    Ok(observed
        .iter()
        .zip(predicted.iter())
        .map(|(o, p)| (o - p) * (o - p))
        .sum())
}

/// RSS of the model against a validated dataset at the given parameters.
///
/// Infallible: the dataset invariant guarantees matching lengths.
pub fn rss_for(model: &EmaxModel, data: &Dataset, params: &EmaxParameters) -> f64 {
    data.doses()
        .iter()
        .zip(data.responses().iter())
        .map(|(&dose, &response)| {
            let residual = response - model.evaluate(dose, params);
            residual * residual
        })
        .sum()
}

/// Residuals (observed minus predicted) per observation.
pub fn residuals(model: &EmaxModel, data: &Dataset, params: &EmaxParameters) -> Array1<f64> {
    let predicted = model.predict(data.doses(), params);

    data.responses() - &predicted
}
