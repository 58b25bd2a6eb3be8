//! Tests for the parametric bootstrap covariance path

use crate::test_helpers::{standard_scenario, synthetic_dataset};
use emaxfit_rs::uncertainty::{estimate_covariance, BootstrapConfig, CovarianceMethod};
use emaxfit_rs::{fit, EmaxParameters};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn bootstrap_spread_is_positive_and_bounded() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let initial = EmaxParameters::new(60.0, 2.0);
    let result = fit(&model, &dataset, &initial).expect("fit succeeds");

    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let estimate = estimate_covariance(
        &model,
        &dataset,
        &result.parameters,
        &CovarianceMethod::Bootstrap(BootstrapConfig::new()),
        &mut rng,
    )
    .expect("valid estimate");

    // A zero spread would mean every refit collapsed onto one draw.
    assert!(
        estimate.standard_errors.max_effect > 0.0 && estimate.standard_errors.max_effect < 20.0,
        "max_effect SE {}",
        estimate.standard_errors.max_effect
    );
    assert!(
        estimate.standard_errors.potency > 0.0 && estimate.standard_errors.potency < 2.0,
        "potency SE {}",
        estimate.standard_errors.potency
    );
}

#[test]
fn bootstrap_reports_no_cross_term() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let result = fit(&model, &dataset, &EmaxParameters::new(60.0, 2.0)).expect("fit succeeds");

    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let estimate = estimate_covariance(
        &model,
        &dataset,
        &result.parameters,
        &CovarianceMethod::Bootstrap(BootstrapConfig::new()),
        &mut rng,
    )
    .expect("valid estimate");

    assert!(estimate.diagonal_only);
    assert_eq!(estimate.covariance.covariance, 0.0);
    assert_eq!(estimate.covariance.correlation(), 0.0);
}

#[test]
fn bootstrap_is_reproducible_given_a_seed() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let result = fit(&model, &dataset, &EmaxParameters::new(60.0, 2.0)).expect("fit succeeds");
    let method = CovarianceMethod::Bootstrap(BootstrapConfig::new());

    let mut rng_a = ChaCha8Rng::seed_from_u64(5);
    let mut rng_b = ChaCha8Rng::seed_from_u64(5);
    let mut rng_c = ChaCha8Rng::seed_from_u64(6);

    let a = estimate_covariance(&model, &dataset, &result.parameters, &method, &mut rng_a)
        .expect("valid estimate");
    let b = estimate_covariance(&model, &dataset, &result.parameters, &method, &mut rng_b)
        .expect("valid estimate");
    let c = estimate_covariance(&model, &dataset, &result.parameters, &method, &mut rng_c)
        .expect("valid estimate");

    assert_eq!(a, b);
    assert_ne!(a.covariance.var_max_effect, c.covariance.var_max_effect);
}

#[test]
fn larger_simulation_noise_widens_the_spread() {
    let (model, truth, doses) = standard_scenario();
    let dataset = synthetic_dataset(&model, &truth, &doses, 5.0, 42);
    let result = fit(&model, &dataset, &EmaxParameters::new(60.0, 2.0)).expect("fit succeeds");

    let quiet_config = BootstrapConfig {
        noise_sd: 1.0,
        ..BootstrapConfig::new()
    };
    let noisy_config = BootstrapConfig::new();

    let mut rng_quiet = ChaCha8Rng::seed_from_u64(17);
    let mut rng_noisy = ChaCha8Rng::seed_from_u64(17);

    let quiet = estimate_covariance(
        &model,
        &dataset,
        &result.parameters,
        &CovarianceMethod::Bootstrap(quiet_config),
        &mut rng_quiet,
    )
    .expect("valid estimate");
    let noisy = estimate_covariance(
        &model,
        &dataset,
        &result.parameters,
        &CovarianceMethod::Bootstrap(noisy_config),
        &mut rng_noisy,
    )
    .expect("valid estimate");

    assert!(
        quiet.standard_errors.max_effect < noisy.standard_errors.max_effect,
        "quiet {} vs noisy {}",
        quiet.standard_errors.max_effect,
        noisy.standard_errors.max_effect
    );
    assert!(quiet.standard_errors.potency < noisy.standard_errors.potency);
}
