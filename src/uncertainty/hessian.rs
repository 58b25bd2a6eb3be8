//! Asymptotic covariance from the observed curvature of the objective.
//!
//! At a least-squares optimum the parameter covariance is approximately
//! `sigma^2 * H^-1`, where `H` is half the Hessian of the RSS (the
//! quadratic-loss Hessian of the normal equations) and
//! `sigma^2 = RSS / (n - 2)` estimates the residual variance with two
//! parameters fitted. The Hessian comes from central finite differences;
//! at 2x2 the inverse is closed-form.

use crate::data::Dataset;
use crate::model::{EmaxModel, EmaxParameters};
use crate::objective::rss_for;
use crate::uncertainty::{CovarianceEstimate, CovarianceMatrix};

/// Half the Hessian of the RSS at `params`, by central differences.
///
/// Returns `(h_max_effect, h_potency, h_cross)` for the symmetric 2x2.
fn half_hessian(
    model: &EmaxModel,
    data: &Dataset,
    params: &EmaxParameters,
    step: f64,
) -> (f64, f64, f64) {
    let at = |max_effect: f64, potency: f64| {
        rss_for(
            model,
            data,
            &EmaxParameters {
                max_effect,
                potency,
            },
        )
    };

    let e = params.max_effect;
    let p = params.potency;
    let center = at(e, p);

    let h_max_effect = (at(e + step, p) - 2.0 * center + at(e - step, p)) / (step * step);
    let h_potency = (at(e, p + step) - 2.0 * center + at(e, p - step)) / (step * step);
    let h_cross = (at(e + step, p + step) - at(e + step, p - step) - at(e - step, p + step)
        + at(e - step, p - step))
        / (4.0 * step * step);

    (h_max_effect / 2.0, h_potency / 2.0, h_cross / 2.0)
}

/// Asymptotic (observed-Hessian) covariance at a point estimate.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `data` - Validated observations
/// * `estimate` - Point estimate, typically the descent output
/// * `fd_step` - Central-difference step (1e-3 is the documented default)
///
/// # Returns
///
/// The full `sigma^2 * H^-1` covariance when the halved Hessian is positive
/// definite. When its determinant is non-positive (too few or uninformative
/// doses), the estimate degrades to the diagonal `sigma^2 / H_ii` per
/// parameter with a zero cross term and `diagonal_only` set; a non-positive
/// diagonal entry degrades further to a 0.0 variance. Never errors.
pub fn asymptotic_covariance(
    model: &EmaxModel,
    data: &Dataset,
    estimate: &EmaxParameters,
    fd_step: f64,
) -> CovarianceEstimate {
    // Dataset validation guarantees n >= 3, so the divisor is positive.
    let n = data.len() as f64;
    let sigma_squared = rss_for(model, data, estimate) / (n - 2.0);

    let (h_max_effect, h_potency, h_cross) = half_hessian(model, data, estimate, fd_step);
    let determinant = h_max_effect * h_potency - h_cross * h_cross;

    if determinant <= 0.0 {
        let var_max_effect = if h_max_effect > 0.0 {
            sigma_squared / h_max_effect
        } else {
            0.0
        };
        let var_potency = if h_potency > 0.0 {
            sigma_squared / h_potency
        } else {
            0.0
        };

        return CovarianceEstimate::from_covariance(
            CovarianceMatrix::new(var_max_effect, var_potency, 0.0),
            true,
        );
    }

    // Closed-form 2x2 inverse scaled by sigma^2.
    let covariance = CovarianceMatrix::new(
        sigma_squared * h_potency / determinant,
        sigma_squared * h_max_effect / determinant,
        sigma_squared * (-h_cross) / determinant,
    );

    CovarianceEstimate::from_covariance(covariance, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_exact_fit_gives_zero_covariance() {
        let model = EmaxModel::new(100.0);
        let truth = EmaxParameters::new(80.0, 1.5);
        let doses = array![0.5, 1.0, 2.0, 3.0, 4.0];
        let responses = model.predict(&doses, &truth);
        let data = Dataset::new(doses, responses).expect("valid dataset");

        let estimate = asymptotic_covariance(&model, &data, &truth, 1e-3);

        // RSS is exactly zero, so sigma^2 and every variance collapse to 0.
        assert!(estimate.covariance.var_max_effect.abs() < 1e-12);
        assert!(estimate.covariance.var_potency.abs() < 1e-12);
        assert!(estimate.covariance.covariance.abs() < 1e-12);
        assert_eq!(estimate.standard_errors.max_effect, 0.0);
    }

    #[test]
    fn test_spread_design_gives_positive_definite_covariance() {
        let model = EmaxModel::new(100.0);
        let truth = EmaxParameters::new(80.0, 1.5);
        let doses = array![0.5, 1.0, 2.0, 3.0, 4.0];
        // Fixed offsets standing in for noise, so the test is deterministic.
        let responses = model.predict(&doses, &truth) + array![2.0, -1.5, 1.0, -2.0, 0.5];
        let data = Dataset::new(doses, responses).expect("valid dataset");

        let estimate = asymptotic_covariance(&model, &data, &truth, 1e-3);

        assert!(!estimate.diagonal_only);
        assert!(estimate.covariance.var_max_effect > 0.0);
        assert!(estimate.covariance.var_potency > 0.0);
        assert!(estimate.covariance.determinant() > 0.0);
        assert!(estimate.standard_errors.max_effect > 0.0);
        assert!(estimate.standard_errors.potency > 0.0);

        // The correlation is a proper value, not a rounding artifact.
        assert!(estimate.covariance.correlation().abs() <= 1.0);
    }

    #[test]
    fn test_replicated_doses_fall_back_to_diagonal() {
        let model = EmaxModel::new(100.0);
        // Four copies of the same dose tell the two parameters apart only
        // through the residual term, and the resulting curvature is
        // indefinite away from the optimum.
        let data = Dataset::new(
            array![1.0, 1.0, 1.0, 1.0],
            array![90.0, 95.0, 85.0, 92.0],
        )
        .expect("valid dataset");
        let estimate_point = EmaxParameters::new(50.0, 1.0);

        let estimate = asymptotic_covariance(&model, &data, &estimate_point, 1e-3);

        assert!(estimate.diagonal_only);
        assert_eq!(estimate.covariance.covariance, 0.0);
        assert!(estimate.covariance.var_max_effect > 0.0);
        assert!(estimate.covariance.var_potency > 0.0);
    }

    #[test]
    fn test_covariance_scales_with_residual_variance() {
        let model = EmaxModel::new(100.0);
        let truth = EmaxParameters::new(80.0, 1.5);
        let doses = array![0.5, 1.0, 2.0, 3.0, 4.0];
        let offsets = array![2.0, -1.5, 1.0, -2.0, 0.5];

        let small = Dataset::new(doses.clone(), model.predict(&doses, &truth) + &offsets)
            .expect("valid dataset");
        let doubled = Dataset::new(
            doses.clone(),
            model.predict(&doses, &truth) + &(&offsets * 2.0),
        )
        .expect("valid dataset");

        let estimate_small = asymptotic_covariance(&model, &small, &truth, 1e-3);
        let estimate_doubled = asymptotic_covariance(&model, &doubled, &truth, 1e-3);

        // Doubling every residual quadruples RSS, hence sigma^2; the Hessian
        // shift is second order, so the variances land close to 4x.
        assert_relative_eq!(
            estimate_doubled.covariance.var_max_effect / estimate_small.covariance.var_max_effect,
            4.0,
            epsilon = 0.5
        );
    }
}
