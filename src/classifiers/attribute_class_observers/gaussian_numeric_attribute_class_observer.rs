use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use crate::core::estimators::GaussianEstimator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaussianNumericAttributeClassObserver {
    min_value_observed_per_class: Vec<f64>,
    max_value_observed_per_class: Vec<f64>,
    attribute_value_distribution_per_class: Vec<Option<GaussianEstimator>>,
}

impl GaussianNumericAttributeClassObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimator(&self, class_val: usize) -> Option<&GaussianEstimator> {
        self.attribute_value_distribution_per_class
            .get(class_val)
            .and_then(Option::as_ref)
    }

    pub fn min_value_observed(&self, class_val: usize) -> Option<f64> {
        self.estimator(class_val)
            .map(|_| self.min_value_observed_per_class[class_val])
    }

    pub fn max_value_observed(&self, class_val: usize) -> Option<f64> {
        self.estimator(class_val)
            .map(|_| self.max_value_observed_per_class[class_val])
    }

    #[inline]
    fn ensure_class(&mut self, class_val: usize) {
        if class_val >= self.attribute_value_distribution_per_class.len() {
            let new_len = class_val + 1;
            self.attribute_value_distribution_per_class
                .resize_with(new_len, || None);
            self.min_value_observed_per_class
                .resize(new_len, f64::INFINITY);
            self.max_value_observed_per_class
                .resize(new_len, f64::NEG_INFINITY);
        }
    }
}

impl AttributeClassObserver for GaussianNumericAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64) {
        if att_val.is_nan() {
            return;
        }
        let w = if weight.is_finite() {
            weight.max(0.0)
        } else {
            0.0
        };
        if w == 0.0 {
            return;
        }

        self.ensure_class(class_val);

        let est = self.attribute_value_distribution_per_class[class_val]
            .get_or_insert_with(GaussianEstimator::new);

        if att_val < self.min_value_observed_per_class[class_val] {
            self.min_value_observed_per_class[class_val] = att_val;
        }
        if att_val > self.max_value_observed_per_class[class_val] {
            self.max_value_observed_per_class[class_val] = att_val;
        }

        est.add_observation(att_val, w);
    }

    fn total_weight_observed(&self) -> f64 {
        self.attribute_value_distribution_per_class
            .iter()
            .flatten()
            .map(GaussianEstimator::total_weight_observed)
            .sum()
    }
}
