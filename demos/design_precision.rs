//! Example of grading candidate dose designs before collecting any data.
//!
//! For each planned design the expected information at the hypothesized
//! parameters is inverted into forecast %RSE values, and designs are ruled
//! adequate or poor against the 50% threshold.

use emaxfit_rs::uncertainty::{DEFAULT_ASSUMED_NOISE_SD, RSE_THRESHOLD};
use emaxfit_rs::{evaluate_design, prediction_band, EmaxModel, EmaxParameters};
use ndarray::{array, Array1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Design precision example");
    println!("========================\n");

    let model = EmaxModel::new(100.0);
    let assumed = EmaxParameters::new(80.0, 1.5);

    println!(
        "Hypothesized curve: max_effect = {}, potency = {}",
        assumed.max_effect, assumed.potency
    );
    println!(
        "Adequacy threshold: both forecast %RSE values <= {}\n",
        RSE_THRESHOLD
    );

    // 1. Compare candidate designs at one noise level
    println!("1. Candidate designs (noise SD = {})", DEFAULT_ASSUMED_NOISE_SD);
    println!("------------------------------------");
    let candidates: Vec<(&str, Array1<f64>)> = vec![
        ("replicated", array![1.0, 1.0, 1.0, 1.0]),
        ("low doses only", array![0.1, 0.2, 0.3, 0.4, 0.5]),
        ("spread", array![0.5, 1.0, 2.0, 3.0, 4.0]),
        ("wide geometric", array![0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0]),
    ];

    for (name, doses) in &candidates {
        let report = evaluate_design(&model, doses, &assumed, DEFAULT_ASSUMED_NOISE_SD)?;

        if report.singular {
            println!("{:<16} singular information matrix, poor", name);
        } else {
            println!(
                "{:<16} %RSE(max_effect) = {:>6.1}, %RSE(potency) = {:>6.1}  ->  {}",
                name,
                report.rse_max_effect,
                report.rse_potency,
                if report.adequate { "adequate" } else { "poor" }
            );
        }
    }

    // 2. Sensitivity of the spread design to the noise assumption
    println!("\n2. Noise sensitivity of the spread design");
    println!("-----------------------------------------");
    let spread = array![0.5, 1.0, 2.0, 3.0, 4.0];
    for noise_sd in [3.0, 5.0, 7.0] {
        let report = evaluate_design(&model, &spread, &assumed, noise_sd)?;
        println!(
            "noise SD {:.0}: %RSE(potency) = {:>6.1}  ->  {}",
            noise_sd,
            report.rse_potency,
            if report.adequate { "adequate" } else { "poor" }
        );
    }

    // 3. Forecast band the chosen design would support
    println!("\n3. Forecast 90% band for the spread design (noise SD = 3)");
    println!("---------------------------------------------------------");
    let report = evaluate_design(&model, &spread, &assumed, 3.0)?;
    let grid = array![0.0, 0.5, 1.0, 2.0, 3.0, 4.0];

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let band = prediction_band(
        &model,
        &assumed,
        &report.covariance,
        &grid,
        2000,
        Some((0.0, 100.0)),
        &mut rng,
    );

    println!("{:>6}  {:>9}  {:>9}  {:>9}", "dose", "lower", "curve", "upper");
    for point in &band {
        println!(
            "{:>6.2}  {:>9.2}  {:>9.2}  {:>9.2}",
            point.dose, point.lower, point.predicted, point.upper
        );
    }

    Ok(())
}
