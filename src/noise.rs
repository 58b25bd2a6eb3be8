//! Normally distributed noise from an injectable uniform source.
//!
//! All randomness in the crate flows through the `rand::Rng` the caller
//! hands in, so deterministic tests can substitute a seeded generator.
//! Normal variates come from the Box-Muller transform on two uniform draws.

use ndarray::Array1;
use rand::Rng;
use std::f64::consts::PI;

use crate::data::Dataset;
use crate::error::Result;
use crate::model::{EmaxModel, EmaxParameters};

/// Draw one standard normal variate.
///
/// Box-Muller from two uniforms. The first draw is mapped into `(0, 1]`
/// so the logarithm never sees zero.
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();

    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Draw a pair of independent standard normal variates.
///
/// Uses both branches of the Box-Muller transform, so one uniform pair
/// yields two variates. The correlated sampler consumes these in pairs.
pub fn standard_normal_pair(rng: &mut impl Rng) -> (f64, f64) {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();

    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * PI * u2;

    (radius * angle.cos(), radius * angle.sin())
}

/// Draw a normal variate with the given mean and standard deviation.
pub fn normal(mean: f64, sd: f64, rng: &mut impl Rng) -> f64 {
    mean + sd * standard_normal(rng)
}

/// Add zero-mean normal noise with standard deviation `sd` to a value.
pub fn noisy(value: f64, sd: f64, rng: &mut impl Rng) -> f64 {
    value + sd * standard_normal(rng)
}

/// Add independent noise to every element of a sequence.
pub fn perturb(values: &Array1<f64>, sd: f64, rng: &mut impl Rng) -> Array1<f64> {
    values.mapv(|value| noisy(value, sd, rng))
}

/// Simulate a dataset by evaluating the model over `doses` and adding
/// independent noise with standard deviation `sd`.
///
/// This is the resimulation step the parametric bootstrap repeats, and the
/// usual way tests manufacture data with known generating parameters.
pub fn simulate_dataset(
    model: &EmaxModel,
    params: &EmaxParameters,
    doses: &Array1<f64>,
    sd: f64,
    rng: &mut impl Rng,
) -> Result<Dataset> {
    let responses = perturb(&model.predict(doses, params), sd, rng);

    Dataset::new(doses.clone(), responses)
}
