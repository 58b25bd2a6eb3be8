//! # Uncertainty Quantification
//!
//! This module turns a point estimate into a precision statement. It includes:
//!
//! - A parametric bootstrap estimator (resimulate and refit)
//! - An asymptotic estimator from the observed RSS Hessian
//! - An expected-information calculation for evaluating a dosing design
//!   before any data exist
//!
//! The two post-fit estimators are interchangeable behind
//! [`CovarianceMethod`]; the asymptotic path is the default. The pre-data
//! path lives in [`evaluate_design`] and needs no observations at all.

mod bootstrap;
mod fisher;
mod hessian;

pub use bootstrap::{bootstrap_covariance, BootstrapConfig};
pub use fisher::{
    evaluate_design, expected_information, DesignReport, DEFAULT_ASSUMED_NOISE_SD, RSE_THRESHOLD,
};
pub use hessian::asymptotic_covariance;

use ndarray::{array, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::Result;
use crate::model::{EmaxModel, EmaxParameters};

/// Default finite-difference step for the asymptotic Hessian.
pub const DEFAULT_FD_STEP: f64 = 1e-3;

/// Symmetric 2x2 covariance over (max_effect, potency).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    /// Variance of max_effect.
    pub var_max_effect: f64,

    /// Variance of potency.
    pub var_potency: f64,

    /// Cross-covariance of max_effect and potency.
    pub covariance: f64,
}

impl CovarianceMatrix {
    /// Create a covariance matrix from its three distinct entries.
    pub fn new(var_max_effect: f64, var_potency: f64, covariance: f64) -> Self {
        Self {
            var_max_effect,
            var_potency,
            covariance,
        }
    }

    /// The all-zero matrix, the sentinel for "no precision information".
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Marginal standard errors, the square roots of the diagonal.
    /// Non-positive variances yield a 0.0 standard error.
    pub fn standard_errors(&self) -> StandardErrors {
        StandardErrors {
            max_effect: if self.var_max_effect > 0.0 {
                self.var_max_effect.sqrt()
            } else {
                0.0
            },
            potency: if self.var_potency > 0.0 {
                self.var_potency.sqrt()
            } else {
                0.0
            },
        }
    }

    /// Pearson correlation of the two parameters; 0.0 when either marginal
    /// variance vanishes.
    pub fn correlation(&self) -> f64 {
        let scale = (self.var_max_effect * self.var_potency).sqrt();
        if scale > 0.0 {
            self.covariance / scale
        } else {
            0.0
        }
    }

    /// The full 2x2 array view, ordered (max_effect, potency).
    pub fn to_array(&self) -> Array2<f64> {
        array![
            [self.var_max_effect, self.covariance],
            [self.covariance, self.var_potency]
        ]
    }

    /// Determinant of the 2x2 matrix.
    pub fn determinant(&self) -> f64 {
        self.var_max_effect * self.var_potency - self.covariance * self.covariance
    }
}

/// Marginal standard errors for the two parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardErrors {
    /// Standard error of max_effect.
    pub max_effect: f64,

    /// Standard error of potency.
    pub potency: f64,
}

/// The interchangeable post-fit covariance strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CovarianceMethod {
    /// Observed-Hessian asymptotic covariance (the default). Deterministic
    /// and cheap; produces the full matrix unless the Hessian degenerates.
    Asymptotic {
        /// Central-difference step for the Hessian.
        fd_step: f64,
    },

    /// Parametric bootstrap: resimulate at the estimate, refit, take the
    /// spread of the draws. Produces no cross term.
    Bootstrap(BootstrapConfig),
}

impl Default for CovarianceMethod {
    fn default() -> Self {
        CovarianceMethod::Asymptotic {
            fd_step: DEFAULT_FD_STEP,
        }
    }
}

/// A covariance estimate plus its derived standard errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceEstimate {
    /// The 2x2 covariance.
    pub covariance: CovarianceMatrix,

    /// Square roots of the diagonal.
    pub standard_errors: StandardErrors,

    /// True when the off-diagonal term is a pinned 0 rather than an
    /// estimate: the Hessian fallback and every bootstrap result.
    pub diagonal_only: bool,
}

impl CovarianceEstimate {
    /// Package a covariance with its standard errors.
    pub fn from_covariance(covariance: CovarianceMatrix, diagonal_only: bool) -> Self {
        Self {
            covariance,
            standard_errors: covariance.standard_errors(),
            diagonal_only,
        }
    }
}

/// Estimate the parameter covariance at a point estimate.
///
/// Dispatches to the configured strategy. The random source is consumed by
/// the bootstrap only; the asymptotic path ignores it.
///
/// # Arguments
///
/// * `model` - The model (fixed baseline)
/// * `data` - Validated observations
/// * `estimate` - Point estimate to quantify, validated here
/// * `method` - Strategy selection
/// * `rng` - Uniform random source
///
/// # Returns
///
/// The covariance estimate, or an `InvalidParameter` error for an unusable
/// point estimate. Numerical degeneracy never errors; it produces the
/// documented diagonal fallback with `diagonal_only` set.
pub fn estimate_covariance(
    model: &EmaxModel,
    data: &Dataset,
    estimate: &EmaxParameters,
    method: &CovarianceMethod,
    rng: &mut impl Rng,
) -> Result<CovarianceEstimate> {
    estimate.validate()?;

    let result = match method {
        CovarianceMethod::Asymptotic { fd_step } => {
            asymptotic_covariance(model, data, estimate, *fd_step)
        }
        CovarianceMethod::Bootstrap(config) => {
            bootstrap_covariance(model, data, estimate, config, rng)
        }
    };

    Ok(result)
}
