//! Observed dose-response data.
//!
//! A [`Dataset`] is the immutable input for one fitting run. It is validated
//! on construction so that every downstream operation (RSS, descent, the
//! asymptotic covariance with its `n - 2` divisor) can assume well-formed
//! finite data of matching lengths.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{EmaxFitError, Result};

/// A single dose-response measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Administered dose, non-negative.
    pub dose: f64,

    /// Measured response at that dose.
    pub response: f64,
}

impl Observation {
    /// Create a new observation.
    pub fn new(dose: f64, response: f64) -> Self {
        Self { dose, response }
    }
}

/// An immutable, validated set of dose-response observations.
///
/// Invariants established at construction:
/// - doses and responses have equal length,
/// - at least 3 observations (the residual variance divisor is `n - 2`),
/// - every value is finite,
/// - every dose is non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    doses: Array1<f64>,
    responses: Array1<f64>,
}

impl Dataset {
    /// Create a dataset from dose and response arrays.
    ///
    /// # Arguments
    ///
    /// * `doses` - Administered doses, all finite and non-negative
    /// * `responses` - Measured responses, all finite, same length as `doses`
    ///
    /// # Returns
    ///
    /// The validated dataset, or an error describing the first violation.
    pub fn new(doses: Array1<f64>, responses: Array1<f64>) -> Result<Self> {
        if doses.len() != responses.len() {
            return Err(EmaxFitError::DimensionMismatch(format!(
                "expected {} responses to match doses, got {}",
                doses.len(),
                responses.len()
            )));
        }

        if doses.len() < 3 {
            return Err(EmaxFitError::InvalidInput(format!(
                "at least 3 observations are required, got {}",
                doses.len()
            )));
        }

        for (i, &dose) in doses.iter().enumerate() {
            if !dose.is_finite() {
                return Err(EmaxFitError::InvalidInput(format!(
                    "dose at index {} is not finite",
                    i
                )));
            }
            if dose < 0.0 {
                return Err(EmaxFitError::InvalidInput(format!(
                    "dose at index {} is negative: {}",
                    i, dose
                )));
            }
        }

        for (i, &response) in responses.iter().enumerate() {
            if !response.is_finite() {
                return Err(EmaxFitError::InvalidInput(format!(
                    "response at index {} is not finite",
                    i
                )));
            }
        }

        Ok(Self { doses, responses })
    }

    /// Create a dataset from a slice of observations.
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        let doses = observations.iter().map(|o| o.dose).collect::<Array1<f64>>();
        let responses = observations
            .iter()
            .map(|o| o.response)
            .collect::<Array1<f64>>();

        Self::new(doses, responses)
    }

    /// The dose values.
    pub fn doses(&self) -> &Array1<f64> {
        &self.doses
    }

    /// The response values.
    pub fn responses(&self) -> &Array1<f64> {
        &self.responses
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.doses.len()
    }

    /// Whether the dataset is empty. Always false for a validated dataset;
    /// provided for API completeness.
    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    /// Reconstruct the observation records, e.g. for serialization.
    pub fn observations(&self) -> Vec<Observation> {
        self.doses
            .iter()
            .zip(self.responses.iter())
            .map(|(&dose, &response)| Observation { dose, response })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_valid_dataset() {
        let data = Dataset::new(array![0.5, 1.0, 2.0, 4.0], array![90.0, 80.0, 65.0, 50.0])
            .expect("valid dataset");

        assert_eq!(data.len(), 4);
        assert!(!data.is_empty());
        assert_eq!(data.doses()[2], 2.0);
        assert_eq!(data.responses()[3], 50.0);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = Dataset::new(array![1.0, 2.0, 3.0], array![90.0, 80.0]);
        assert!(matches!(result, Err(EmaxFitError::DimensionMismatch(_))));
    }

    #[test]
    fn test_too_small_dataset_rejected() {
        let result = Dataset::new(array![1.0, 2.0], array![90.0, 80.0]);
        assert!(matches!(result, Err(EmaxFitError::InvalidInput(_))));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let result = Dataset::new(array![1.0, f64::NAN, 3.0], array![90.0, 80.0, 70.0]);
        assert!(matches!(result, Err(EmaxFitError::InvalidInput(_))));

        let result = Dataset::new(array![1.0, 2.0, 3.0], array![90.0, f64::INFINITY, 70.0]);
        assert!(matches!(result, Err(EmaxFitError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_dose_rejected() {
        let result = Dataset::new(array![1.0, -2.0, 3.0], array![90.0, 80.0, 70.0]);
        assert!(matches!(result, Err(EmaxFitError::InvalidInput(_))));
    }

    #[test]
    fn test_observation_round_trip() {
        let observations = vec![
            Observation::new(0.5, 92.1),
            Observation::new(1.0, 84.3),
            Observation::new(2.0, 68.9),
        ];

        let data = Dataset::from_observations(&observations).expect("valid dataset");
        assert_eq!(data.observations(), observations);
    }
}
