//! Bounded gradient descent for the Emax parameters.
//!
//! Finite-difference gradient descent over (max_effect, potency) with
//! projection into a fixed admissible box, a decaying learning rate, and
//! best-seen tracking. The loop always runs the configured iteration count;
//! there is no convergence-based early exit, so the cost of a fit is fixed
//! by its configuration. Parameters that stray outside the box are clamped,
//! never rejected.

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::model::{EmaxModel, EmaxParameters};
use crate::objective::rss_for;

/// Inclusive bounds on one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum allowed value.
    pub min: f64,

    /// Maximum allowed value.
    pub max: f64,
}

impl Bounds {
    /// Create bounds without validation; used for the fixed boxes below.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Whether a value lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The admissible box for the two free parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBox {
    /// Bounds on max_effect.
    pub max_effect: Bounds,

    /// Bounds on potency. The lower edge keeps potency strictly positive.
    pub potency: Bounds,
}

impl Default for ParameterBox {
    fn default() -> Self {
        Self {
            max_effect: Bounds::new(0.0, 100.0),
            potency: Bounds::new(0.01, 10.0),
        }
    }
}

impl ParameterBox {
    /// Project a parameter vector into the box.
    pub fn project(&self, params: &EmaxParameters) -> EmaxParameters {
        EmaxParameters {
            max_effect: self.max_effect.clamp(params.max_effect),
            potency: self.potency.clamp(params.potency),
        }
    }

    /// Whether a parameter vector lies within the box.
    pub fn contains(&self, params: &EmaxParameters) -> bool {
        self.max_effect.contains(params.max_effect) && self.potency.contains(params.potency)
    }
}

/// Bounded gradient descent configuration.
///
/// The defaults sit at the slow-and-steady corner of the documented ranges:
/// with the x0.95-per-100-iterations decay, a 0.01 starting rate needs the
/// full 2000-iteration budget before the steps are small enough for the
/// potency coordinate to settle instead of bouncing between the box walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientDescent {
    /// Number of iterations to run. Always performed in full. Default: 2000.
    pub iterations: usize,

    /// Initial learning rate. Default: 0.01.
    pub learning_rate: f64,

    /// Forward-difference step for gradient estimation. Default: 1e-3.
    pub fd_step: f64,

    /// Multiplicative learning-rate decay. Default: 0.95.
    pub decay_factor: f64,

    /// Iterations between decays; zero is treated as one. Default: 100.
    pub decay_interval: usize,

    /// Admissible box applied after every update.
    pub bounds: ParameterBox,
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self {
            iterations: 2000,
            learning_rate: 0.01,
            fd_step: 1e-3,
            decay_factor: 0.95,
            decay_interval: 100,
            bounds: ParameterBox::default(),
        }
    }
}

/// Result of one descent run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescentResult {
    /// Best-seen parameters, inside the admissible box.
    pub parameters: EmaxParameters,

    /// RSS at the best-seen parameters.
    pub rss: f64,

    /// Iterations performed (always the configured count).
    pub iterations: usize,

    /// Number of objective evaluations.
    pub func_evals: usize,
}

impl GradientDescent {
    /// Create an optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an optimizer with a custom budget.
    ///
    /// # Arguments
    ///
    /// * `iterations` - Iteration count (1000-2000 is typical)
    /// * `learning_rate` - Initial learning rate (0.01-0.05 is typical)
    pub fn with_budget(iterations: usize, learning_rate: f64) -> Self {
        Self {
            iterations,
            learning_rate,
            ..Self::default()
        }
    }

    /// Minimize RSS over (max_effect, potency) with the baseline fixed.
    ///
    /// The initial point is projected into the box before the first
    /// iteration, so the returned parameters are inside the box for any
    /// starting point. Each iteration estimates the gradient by forward
    /// finite differences, takes a step, and clamps the iterate back into
    /// the box. The vector with the lowest RSS seen anywhere along the
    /// trajectory is returned, which guards against the oscillation the
    /// larger configured learning rates produce late in a run.
    ///
    /// Never errors: ill-posed data and parameters are rejected by the
    /// `Dataset` and `EmaxParameters` validators before this point.
    pub fn fit(
        &self,
        model: &EmaxModel,
        data: &Dataset,
        initial: &EmaxParameters,
    ) -> DescentResult {
        let mut current = self.bounds.project(initial);
        let mut best = current;
        let mut best_rss = rss_for(model, data, &current);
        let mut learning_rate = self.learning_rate;
        let mut func_evals = 1;

        for iteration in 0..self.iterations {
            let base = rss_for(model, data, &current);
            func_evals += 1;

            if base < best_rss {
                best = current;
                best_rss = base;
            }

            // Forward differences; the bumped points are not clamped.
            let bumped_max = EmaxParameters {
                max_effect: current.max_effect + self.fd_step,
                ..current
            };
            let grad_max_effect = (rss_for(model, data, &bumped_max) - base) / self.fd_step;

            let bumped_potency = EmaxParameters {
                potency: current.potency + self.fd_step,
                ..current
            };
            let grad_potency = (rss_for(model, data, &bumped_potency) - base) / self.fd_step;
            func_evals += 2;

            current = self.bounds.project(&EmaxParameters {
                max_effect: current.max_effect - learning_rate * grad_max_effect,
                potency: current.potency - learning_rate * grad_potency,
            });

            if (iteration + 1) % self.decay_interval.max(1) == 0 {
                learning_rate *= self.decay_factor;
            }
        }

        // The loop scores iterates before updating them, so the final
        // iterate still needs a look.
        let final_rss = rss_for(model, data, &current);
        func_evals += 1;
        if final_rss < best_rss {
            best = current;
            best_rss = final_rss;
        }

        DescentResult {
            parameters: best,
            rss: best_rss,
            iterations: self.iterations,
            func_evals,
        }
    }
}
