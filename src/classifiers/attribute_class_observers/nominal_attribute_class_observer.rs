use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use serde::{Deserialize, Serialize};

/// Weighted frequency table of category values, one row per class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NominalAttributeClassObserver {
    total_weight_observed: f64,
    missing_weight_observed: f64,
    attribute_value_distribution_per_class: Vec<Vec<f64>>,
}

impl NominalAttributeClassObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight observed for `value` among instances of class `class_val`.
    pub fn weight_of(&self, class_val: usize, value: usize) -> f64 {
        self.attribute_value_distribution_per_class
            .get(class_val)
            .and_then(|row| row.get(value))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn class_distribution(&self, class_val: usize) -> &[f64] {
        self.attribute_value_distribution_per_class
            .get(class_val)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_weight_of_class(&self, class_val: usize) -> f64 {
        self.class_distribution(class_val).iter().sum()
    }

    pub fn number_of_observed_classes(&self) -> usize {
        self.attribute_value_distribution_per_class.len()
    }

    pub fn missing_weight_observed(&self) -> f64 {
        self.missing_weight_observed
    }

    #[inline]
    fn cell_mut(&mut self, class_val: usize, value: usize) -> &mut f64 {
        let rows = &mut self.attribute_value_distribution_per_class;
        if class_val >= rows.len() {
            rows.resize_with(class_val + 1, Vec::new);
        }
        let row = &mut rows[class_val];
        if value >= row.len() {
            row.resize(value + 1, 0.0);
        }
        &mut row[value]
    }
}

impl AttributeClassObserver for NominalAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64) {
        if !weight.is_finite() || weight <= 0.0 {
            return;
        }
        if att_val.is_nan() {
            self.missing_weight_observed += weight;
            return;
        }
        if att_val < 0.0 {
            return;
        }
        *self.cell_mut(class_val, att_val as usize) += weight;
        self.total_weight_observed += weight;
    }

    fn total_weight_observed(&self) -> f64 {
        self.total_weight_observed
    }
}
