use crate::core::attributes::{NominalAttribute, NumericAttribute};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, IntoStaticStr};

/// Schema descriptor for one column of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[strum_discriminants(name(AttributeKind))]
#[strum_discriminants(derive(Display, IntoStaticStr))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum Attribute {
    Nominal(NominalAttribute),
    Numeric(NumericAttribute),
}

impl Attribute {
    pub fn nominal<N: Into<String>>(name: N, values: &[&str]) -> Attribute {
        Attribute::Nominal(NominalAttribute::with_values(
            name.into(),
            values.iter().map(|v| v.to_string()).collect(),
        ))
    }

    pub fn numeric<N: Into<String>>(name: N) -> Attribute {
        Attribute::Numeric(NumericAttribute::new(name.into()))
    }

    pub fn name(&self) -> &str {
        match self {
            Attribute::Nominal(a) => &a.name,
            Attribute::Numeric(a) => &a.name,
        }
    }

    pub fn kind(&self) -> AttributeKind {
        AttributeKind::from(self)
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, Attribute::Nominal(_))
    }

    pub fn as_nominal(&self) -> Option<&NominalAttribute> {
        match self {
            Attribute::Nominal(a) => Some(a),
            Attribute::Numeric(_) => None,
        }
    }

    /// Category count for nominal attributes, 0 for numeric ones.
    pub fn number_of_values(&self) -> usize {
        match self {
            Attribute::Nominal(a) => a.number_of_values(),
            Attribute::Numeric(_) => 0,
        }
    }

    pub fn arff_representation(&self) -> String {
        match self {
            Attribute::Nominal(a) => a.arff_representation(),
            Attribute::Numeric(a) => a.arff_representation(),
        }
    }
}
