use crate::classifiers::attribute_class_observers::{
    AttributeClassObserver, GaussianNumericAttributeClassObserver, NominalAttributeClassObserver,
};
use crate::core::attributes::{Attribute, AttributeKind};
use serde::{Deserialize, Serialize};

/// Observer variant picked once from the attribute type when a processor is
/// set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AttributeObserver {
    Nominal(NominalAttributeClassObserver),
    Numeric(GaussianNumericAttributeClassObserver),
}

impl AttributeObserver {
    pub fn for_attribute(attribute: &Attribute) -> Self {
        match attribute {
            Attribute::Nominal(_) => {
                AttributeObserver::Nominal(NominalAttributeClassObserver::new())
            }
            Attribute::Numeric(_) => {
                AttributeObserver::Numeric(GaussianNumericAttributeClassObserver::new())
            }
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeObserver::Nominal(_) => AttributeKind::Nominal,
            AttributeObserver::Numeric(_) => AttributeKind::Numeric,
        }
    }

    pub fn as_nominal(&self) -> Option<&NominalAttributeClassObserver> {
        match self {
            AttributeObserver::Nominal(obs) => Some(obs),
            AttributeObserver::Numeric(_) => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&GaussianNumericAttributeClassObserver> {
        match self {
            AttributeObserver::Numeric(obs) => Some(obs),
            AttributeObserver::Nominal(_) => None,
        }
    }
}

impl AttributeClassObserver for AttributeObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64) {
        match self {
            AttributeObserver::Nominal(obs) => {
                obs.observe_attribute_class(att_val, class_val, weight)
            }
            AttributeObserver::Numeric(obs) => {
                obs.observe_attribute_class(att_val, class_val, weight)
            }
        }
    }

    fn total_weight_observed(&self) -> f64 {
        match self {
            AttributeObserver::Nominal(obs) => obs.total_weight_observed(),
            AttributeObserver::Numeric(obs) => obs.total_weight_observed(),
        }
    }
}
