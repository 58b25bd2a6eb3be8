//! Tests for the asymptotic (observed-Hessian) covariance path
//!
//! These go through the public entry points: the default `fit` pipeline and
//! the `estimate_covariance` dispatcher.

use crate::test_helpers::{standard_scenario, synthetic_dataset};
use emaxfit_rs::uncertainty::{estimate_covariance, CovarianceMethod, DEFAULT_FD_STEP};
use emaxfit_rs::{fit, Dataset, EmaxFitError, EmaxParameters};
use ndarray::array;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn fitted_estimate_carries_a_full_covariance() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let initial = EmaxParameters::new(60.0, 2.0);

    let result = fit(&model, &dataset, &initial).expect("fit succeeds");

    assert!(!result.diagonal_covariance);
    assert!(result.covariance.determinant() > 0.0);

    // Order-of-magnitude windows for this design at this noise level.
    assert!(
        result.standard_errors.max_effect > 1.0 && result.standard_errors.max_effect < 40.0,
        "max_effect SE {}",
        result.standard_errors.max_effect
    );
    assert!(
        result.standard_errors.potency > 0.03 && result.standard_errors.potency < 3.0,
        "potency SE {}",
        result.standard_errors.potency
    );

    // Max effect and potency trade off along the fitted curve, so their
    // estimates are strongly positively correlated.
    let correlation = result.covariance.correlation();
    assert!(
        correlation > 0.5 && correlation < 1.0,
        "correlation {}",
        correlation
    );
}

#[test]
fn dispatcher_default_matches_the_fit_pipeline() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let initial = EmaxParameters::new(60.0, 2.0);

    let result = fit(&model, &dataset, &initial).expect("fit succeeds");

    // The asymptotic path never touches the random source.
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let estimate = estimate_covariance(
        &model,
        &dataset,
        &result.parameters,
        &CovarianceMethod::default(),
        &mut rng,
    )
    .expect("valid estimate");

    assert_eq!(estimate.covariance, result.covariance);
    assert_eq!(estimate.diagonal_only, result.diagonal_covariance);
    assert!(matches!(
        CovarianceMethod::default(),
        CovarianceMethod::Asymptotic { fd_step } if fd_step == DEFAULT_FD_STEP
    ));
}

#[test]
fn noiseless_data_report_zero_uncertainty() {
    let (model, truth, doses) = standard_scenario();
    let responses = model.predict(&doses, &truth);
    let dataset = Dataset::new(doses, responses).expect("valid dataset");

    // Starting at the generating parameters, no iterate can improve on a
    // zero residual, so the fit returns them unchanged.
    let result = fit(&model, &dataset, &truth).expect("fit succeeds");

    assert_eq!(result.rss, 0.0);
    assert_eq!(result.parameters, truth);
    assert_eq!(result.standard_errors.max_effect, 0.0);
    assert_eq!(result.standard_errors.potency, 0.0);
}

#[test]
fn replicated_doses_degrade_to_diagonal() {
    let model = emaxfit_rs::EmaxModel::new(100.0);
    let dataset = Dataset::new(array![1.0, 1.0, 1.0, 1.0], array![90.0, 95.0, 85.0, 92.0])
        .expect("valid dataset");
    let estimate_point = EmaxParameters::new(50.0, 1.0);

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let estimate = estimate_covariance(
        &model,
        &dataset,
        &estimate_point,
        &CovarianceMethod::Asymptotic {
            fd_step: DEFAULT_FD_STEP,
        },
        &mut rng,
    )
    .expect("valid estimate");

    assert!(estimate.diagonal_only);
    assert_eq!(estimate.covariance.covariance, 0.0);
    assert!(estimate.covariance.var_max_effect > 0.0);
    assert!(estimate.covariance.var_potency > 0.0);
}

#[test]
fn unusable_point_estimate_is_rejected() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let bad = EmaxParameters::new(80.0, 0.0);

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let result = estimate_covariance(
        &model,
        &dataset,
        &bad,
        &CovarianceMethod::default(),
        &mut rng,
    );

    assert!(matches!(result, Err(EmaxFitError::InvalidParameter(_))));
}
