use serde::{Deserialize, Serialize};

/// Weighted running sufficient statistics of a Gaussian, updated with
/// Welford's recurrence so no raw samples are retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaussianEstimator {
    weight_sum: f64,
    mean: f64,
    variance_sum: f64,
}

impl GaussianEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observation(&mut self, value: f64, weight: f64) {
        if value.is_nan() || !(weight > 0.0) || !weight.is_finite() {
            return;
        }
        self.weight_sum += weight;
        let delta = value - self.mean;
        self.mean += weight * delta / self.weight_sum;
        self.variance_sum += weight * delta * (value - self.mean);
    }

    pub fn total_weight_observed(&self) -> f64 {
        self.weight_sum
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations from the mean (Welford's `M2`).
    pub fn variance_sum(&self) -> f64 {
        self.variance_sum
    }

    /// Unbiased variance, `M2 / (n - 1)`; zero until more than one unit of
    /// weight has been seen.
    pub fn variance(&self) -> f64 {
        if self.weight_sum > 1.0 {
            self.variance_sum / (self.weight_sum - 1.0)
        } else {
            0.0
        }
    }

    /// Population variance, `M2 / n`.
    pub fn population_variance(&self) -> f64 {
        if self.weight_sum > 0.0 {
            self.variance_sum / self.weight_sum
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
