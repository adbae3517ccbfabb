use crate::core::attributes::Attribute;
use serde::{Deserialize, Serialize};

/// Immutable schema shared by every instance of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceHeader {
    pub relation_name: String,
    pub attributes: Vec<Attribute>,
    pub class_index: usize,
}

impl InstanceHeader {
    pub fn new(
        relation_name: String,
        attributes: Vec<Attribute>,
        class_index: usize,
    ) -> InstanceHeader {
        InstanceHeader {
            relation_name,
            attributes,
            class_index,
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute_at_index(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn index_of_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.name() == name)
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn class_attribute(&self) -> Option<&Attribute> {
        self.attributes.get(self.class_index)
    }

    /// Number of labels of the class attribute; 0 when the class attribute is
    /// missing or numeric.
    pub fn number_of_classes(&self) -> usize {
        self.class_attribute()
            .map(Attribute::number_of_values)
            .unwrap_or(0)
    }

    /// Checks the header can drive a classification stream: the class index
    /// points at a nominal attribute with at least one label.
    pub fn check_classification(&self) -> Result<(), String> {
        match self.class_attribute() {
            None => Err(format!(
                "class index {} out of range for {} attributes",
                self.class_index,
                self.attributes.len()
            )),
            Some(Attribute::Numeric(a)) => {
                Err(format!("class attribute '{}' must be nominal", a.name))
            }
            Some(Attribute::Nominal(a)) if a.values.is_empty() => {
                Err(format!("class attribute '{}' has no labels", a.name))
            }
            Some(Attribute::Nominal(_)) => Ok(()),
        }
    }
}
