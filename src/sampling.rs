//! Correlated parameter sampling and prediction bands.
//!
//! Draws from the bivariate normal implied by a fitted covariance, then
//! pushes every draw through the model over a dose grid; the empirical
//! 5th/95th percentiles of the predictions at each grid point form a 90%
//! band for plotting. A covariance that is not positive definite yields no
//! draws and hence no band; that is a defined "no band available" state
//! rather than an error.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{EmaxModel, EmaxParameters};
use crate::noise::standard_normal_pair;
use crate::uncertainty::CovarianceMatrix;

/// Probability mass inside the band (5th to 95th percentile).
const BAND_CONFIDENCE: f64 = 0.90;

/// One grid point of a prediction band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    /// Grid dose.
    pub dose: f64,

    /// Point-estimate prediction at this dose.
    pub predicted: f64,

    /// Lower band edge (5th percentile).
    pub lower: f64,

    /// Upper band edge (95th percentile).
    pub upper: f64,
}

/// Lower-triangular Cholesky factor of a 2x2 covariance.
///
/// Returns `(l11, l21, l22)`, or `None` when the matrix is not positive
/// definite (non-positive leading variance, or a non-finite-positive
/// second pivot).
fn cholesky2(covariance: &CovarianceMatrix) -> Option<(f64, f64, f64)> {
    if covariance.var_max_effect <= 0.0 {
        return None;
    }

    let l11 = covariance.var_max_effect.sqrt();
    let l21 = covariance.covariance / l11;
    let l22 = (covariance.var_potency - l21 * l21).sqrt();

    if !l22.is_finite() || l22 <= 0.0 {
        return None;
    }

    Some((l11, l21, l22))
}

/// Draw `n` correlated parameter vectors from a bivariate normal.
///
/// # Arguments
///
/// * `mean` - Distribution mean, usually the point estimate
/// * `covariance` - 2x2 covariance over (max_effect, potency)
/// * `n` - Number of draws
/// * `rng` - Uniform random source
///
/// # Returns
///
/// `n` draws `mean + L * z` with `z` a standard normal pair, or an empty
/// vector when the covariance is not positive definite. Draws are not
/// clamped; a consumer that needs the admissible box applies it.
pub fn sample_bivariate_normal(
    mean: &EmaxParameters,
    covariance: &CovarianceMatrix,
    n: usize,
    rng: &mut impl Rng,
) -> Vec<EmaxParameters> {
    let (l11, l21, l22) = match cholesky2(covariance) {
        Some(factor) => factor,
        None => return Vec::new(),
    };

    (0..n)
        .map(|_| {
            let (z1, z2) = standard_normal_pair(rng);

            EmaxParameters {
                max_effect: mean.max_effect + l11 * z1,
                potency: mean.potency + l21 * z1 + l22 * z2,
            }
        })
        .collect()
}

/// Empirical central interval from a sorted sample.
fn percentile_interval(sorted: &[f64], confidence: f64) -> (f64, f64) {
    let n = sorted.len();
    let lower_idx = ((n as f64) * ((1.0 - confidence) / 2.0)).round() as usize;
    let upper_idx = ((n as f64) * (1.0 - (1.0 - confidence) / 2.0)).round() as usize;

    (
        sorted[lower_idx.min(n - 1)],
        sorted[upper_idx.min(n - 1)],
    )
}

/// Build a 90% prediction band over a dose grid.
///
/// Draws `samples` parameter vectors once, evaluates each across the grid,
/// and takes the 5th/95th empirical percentiles per grid point. When a
/// plotting `range` is given, the band edges are clamped into it; the
/// point-estimate curve is left untouched.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `mean` - Point estimate at the band's center
/// * `covariance` - Fitted parameter covariance
/// * `grid` - Doses to evaluate the band at
/// * `samples` - Number of parameter draws (>= 1000 for a stable band)
/// * `range` - Optional plotting range `(min, max)` for the band edges
/// * `rng` - Uniform random source
///
/// # Returns
///
/// One [`BandPoint`] per grid dose, or an empty vector when the covariance
/// admits no draws ("no band available") or `samples` is 0.
pub fn prediction_band(
    model: &EmaxModel,
    mean: &EmaxParameters,
    covariance: &CovarianceMatrix,
    grid: &Array1<f64>,
    samples: usize,
    range: Option<(f64, f64)>,
    rng: &mut impl Rng,
) -> Vec<BandPoint> {
    let draws = sample_bivariate_normal(mean, covariance, samples, rng);
    if draws.is_empty() {
        return Vec::new();
    }

    grid.iter()
        .map(|&dose| {
            let mut predictions: Vec<f64> = draws
                .iter()
                .map(|draw| model.evaluate(dose, draw))
                .collect();
            predictions
                .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let (mut lower, mut upper) = percentile_interval(&predictions, BAND_CONFIDENCE);
            if let Some((min, max)) = range {
                lower = lower.max(min).min(max);
                upper = upper.max(min).min(max);
            }

            BandPoint {
                dose,
                predicted: model.evaluate(dose, mean),
                lower,
                upper,
            }
        })
        .collect()
}
