use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::instance::Instance;
use std::fmt::{Display, Formatter};
use std::io::Error;
use std::sync::Arc;

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct DenseInstance {
    pub header: Arc<InstanceHeader>,
    pub values: Vec<f64>,
    pub weight: f64,
}

impl DenseInstance {
    pub fn new(header: Arc<InstanceHeader>, values: Vec<f64>, weight: f64) -> DenseInstance {
        DenseInstance {
            header,
            values,
            weight,
        }
    }

    pub fn with_default_weight(header: Arc<InstanceHeader>, values: Vec<f64>) -> DenseInstance {
        DenseInstance::new(header, values, DEFAULT_WEIGHT)
    }
}

impl Instance for DenseInstance {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, new_value: f64) -> Result<(), Error> {
        if new_value < 0.0 {
            Err(Error::new(
                std::io::ErrorKind::InvalidInput,
                "Weight cannot be negative",
            ))
        } else {
            self.weight = new_value;
            Ok(())
        }
    }

    fn value_at_index(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn is_missing_at_index(&self, index: usize) -> Result<bool, Error> {
        match self.values.get(index) {
            Some(v) => Ok(v.is_nan()),
            None => Err(Error::new(
                std::io::ErrorKind::InvalidInput,
                "Index out of bounds",
            )),
        }
    }

    fn attribute_at_index(&self, index: usize) -> Option<&Attribute> {
        self.header.attribute_at_index(index)
    }

    fn number_of_attributes(&self) -> usize {
        self.header.number_of_attributes()
    }

    fn class_index(&self) -> usize {
        self.header.class_index()
    }

    fn class_value(&self) -> Option<f64> {
        self.values.get(self.header.class_index()).copied()
    }

    fn is_class_missing(&self) -> bool {
        self.class_value().is_none_or(f64::is_nan)
    }

    fn number_of_classes(&self) -> usize {
        self.header.number_of_classes()
    }

    fn to_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }
}

impl Display for DenseInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<String> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if v.is_nan() {
                    return "?".to_string();
                }
                match self.header.attribute_at_index(i) {
                    Some(Attribute::Nominal(a)) if a.is_valid_value(*v) => {
                        a.values[*v as usize].clone()
                    }
                    _ => v.to_string(),
                }
            })
            .collect();
        write!(f, "{}", cells.join(","))?;
        if self.weight != DEFAULT_WEIGHT {
            write!(f, ",{{{}}}", self.weight)?;
        }
        Ok(())
    }
}
