//! # emaxfit-rs
//!
//! `emaxfit-rs` fits a saturable Emax dose-response curve to noisy
//! observations and quantifies how precise the fit is. A companion pre-data
//! mode forecasts the precision of a planned dosing design before any
//! measurements exist.
//!
//! The library provides:
//! - The Emax model evaluator with analytic log-scale sensitivities
//! - Bounded finite-difference gradient descent with best-seen tracking
//! - Two interchangeable covariance estimators (asymptotic and bootstrap)
//! - Expected-information design evaluation with %RSE grading
//! - Correlated parameter sampling and 90% prediction bands
//!
//! Every operation is a pure function of explicit inputs; randomness is
//! injected through `rand::Rng` so callers control determinism. There is no
//! I/O, no global state, and no long-lived engine object.
//!
//! ## Basic Usage
//!
//! ```
//! use emaxfit_rs::{fit, Dataset, EmaxModel, EmaxParameters};
//! use ndarray::array;
//!
//! let model = EmaxModel::new(100.0);
//! let truth = EmaxParameters::new(80.0, 1.5);
//! let doses = array![0.5, 1.0, 2.0, 3.0, 4.0];
//! let data = Dataset::new(doses.clone(), model.predict(&doses, &truth)).unwrap();
//!
//! let initial = EmaxParameters::new(60.0, 2.0);
//! let result = fit(&model, &data, &initial).unwrap();
//!
//! let initial_rss = emaxfit_rs::objective::rss_for(&model, &data, &initial);
//! assert!(result.rss < initial_rss);
//! assert!((result.parameters.max_effect - 80.0).abs() / 80.0 < 0.2);
//! ```

// Public modules
pub mod data;
pub mod descent;
pub mod error;
pub mod model;
pub mod noise;
pub mod objective;
pub mod sampling;
pub mod uncertainty;

// Re-exports for convenience
pub use data::{Dataset, Observation};
pub use descent::GradientDescent;
pub use error::{EmaxFitError, Result};
pub use model::{fit, fit_with, EmaxModel, EmaxParameters, FitResult};
pub use sampling::{prediction_band, BandPoint};
pub use uncertainty::{evaluate_design, CovarianceMatrix, CovarianceMethod, DesignReport};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
