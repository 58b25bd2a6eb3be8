//! Parametric bootstrap covariance.
//!
//! Resimulates datasets at the point estimate with fresh noise, refits each
//! with a short, aggressive descent, and reads the marginal spread of the
//! refit draws as the standard error. The refits share the descent's box
//! and decay schedule but run a reduced budget at a raised learning rate.
//!
//! The strategy has two documented limitations. It produces no
//! cross-covariance (the off-diagonal is pinned to 0 and the estimate is
//! flagged `diagonal_only`). And the refits start from a neutral initial
//! point rather than the estimate itself: under a fixed-budget descent with
//! no early exit, a refit seeded at the optimum of its own resimulated data
//! never finds a better iterate, so every draw would collapse to the seed
//! and the spread to exactly zero.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::descent::GradientDescent;
use crate::model::{EmaxModel, EmaxParameters};
use crate::noise::perturb;
use crate::uncertainty::{CovarianceEstimate, CovarianceMatrix};

/// Parametric bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resimulated datasets. Default: 75.
    pub samples: usize,

    /// Noise standard deviation for resimulation. Default: 3.0.
    pub noise_sd: f64,

    /// Iteration budget per refit, below the default fit budget.
    /// Default: 600.
    pub refit_iterations: usize,

    /// Initial learning rate per refit, above the default fit rate.
    /// Default: 0.02.
    pub refit_learning_rate: f64,

    /// Neutral starting point for every refit. Default: {50, 1}.
    pub refit_initial: EmaxParameters,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            samples: 75,
            noise_sd: 3.0,
            refit_iterations: 600,
            refit_learning_rate: 0.02,
            refit_initial: EmaxParameters {
                max_effect: 50.0,
                potency: 1.0,
            },
        }
    }
}

impl BootstrapConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The descent used for each refit.
    fn refit_descent(&self) -> GradientDescent {
        GradientDescent::with_budget(self.refit_iterations, self.refit_learning_rate)
    }
}

/// Population standard deviation (divide by N, not N - 1).
fn population_sd(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    variance.sqrt()
}

/// Bootstrap covariance at a point estimate.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `data` - Validated observations; only the dose design is reused
/// * `estimate` - Point estimate the resimulation evaluates
/// * `config` - Bootstrap settings
/// * `rng` - Uniform random source for the resimulation noise
///
/// # Returns
///
/// A diagonal covariance estimate: marginal variances are the squared
/// population standard deviations of the refit draws, the cross term is 0,
/// and `diagonal_only` is always set. Never errors.
pub fn bootstrap_covariance(
    model: &EmaxModel,
    data: &Dataset,
    estimate: &EmaxParameters,
    config: &BootstrapConfig,
    rng: &mut impl Rng,
) -> CovarianceEstimate {
    let descent = config.refit_descent();
    let ideal = model.predict(data.doses(), estimate);

    let mut max_effect_draws = Vec::with_capacity(config.samples);
    let mut potency_draws = Vec::with_capacity(config.samples);

    for _ in 0..config.samples {
        let responses = perturb(&ideal, config.noise_sd, rng);

        // The dose design was validated with the dataset and the simulated
        // responses are finite, so the rebuild cannot fail; an Err here
        // would mean the dataset invariant was broken upstream.
        let resimulated = match Dataset::new(data.doses().clone(), responses) {
            Ok(dataset) => dataset,
            Err(_) => continue,
        };

        let refit = descent.fit(model, &resimulated, &config.refit_initial);
        max_effect_draws.push(refit.parameters.max_effect);
        potency_draws.push(refit.parameters.potency);
    }

    let sd_max_effect = population_sd(&max_effect_draws);
    let sd_potency = population_sd(&potency_draws);

    CovarianceEstimate::from_covariance(
        CovarianceMatrix::new(sd_max_effect * sd_max_effect, sd_potency * sd_potency, 0.0),
        true,
    )
}
