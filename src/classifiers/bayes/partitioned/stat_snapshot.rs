use crate::classifiers::attribute_class_observers::AttributeObserver;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Immutable copy of one processor's statistics, published to the model.
///
/// `observers[k]` describes attribute `i_min + k`. The copy is detached from
/// the processor, which keeps training its own observers after publishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub processor_id: usize,
    pub i_min: usize,
    pub i_max: usize,
    pub observers: Arc<Vec<AttributeObserver>>,
    pub n_train: u64,
    pub n_train_per_class: Arc<Vec<u64>>,
    pub is_last: bool,
}

impl StatSnapshot {
    pub fn observer_at(&self, attribute_index: usize) -> Option<&AttributeObserver> {
        attribute_index
            .checked_sub(self.i_min)
            .filter(|_| attribute_index <= self.i_max)
            .and_then(|k| self.observers.get(k))
    }

    pub fn covers(&self, attribute_index: usize) -> bool {
        (self.i_min..=self.i_max).contains(&attribute_index)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Display for StatSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processor={}, range=[{}, {}], n_train={}, last={}",
            self.processor_id, self.i_min, self.i_max, self.n_train, self.is_last
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::attribute_class_observers::AttributeClassObserver;
    use crate::core::attributes::Attribute;

    fn snapshot() -> StatSnapshot {
        let mut first = AttributeObserver::for_attribute(&Attribute::numeric("x"));
        first.observe_attribute_class(1.5, 0, 1.0);
        let second = AttributeObserver::for_attribute(&Attribute::nominal("c", &["a", "b"]));
        StatSnapshot {
            processor_id: 1,
            i_min: 3,
            i_max: 4,
            observers: Arc::new(vec![first, second]),
            n_train: 1,
            n_train_per_class: Arc::new(vec![1, 0]),
            is_last: false,
        }
    }

    #[test]
    fn observer_lookup_is_by_global_index() {
        let snap = snapshot();
        assert!(snap.observer_at(2).is_none());
        assert!(snap.observer_at(3).unwrap().as_numeric().is_some());
        assert!(snap.observer_at(4).unwrap().as_nominal().is_some());
        assert!(snap.observer_at(5).is_none());
        assert!(snap.covers(4));
        assert!(!snap.covers(5));
    }

    #[test]
    fn json_export_carries_range_and_observers() {
        let json: serde_json::Value = serde_json::from_str(&snapshot().to_json().unwrap()).unwrap();
        assert_eq!(json["i_min"], 3);
        assert_eq!(json["i_max"], 4);
        assert_eq!(json["observers"][0]["type"], "numeric");
        assert_eq!(json["observers"][1]["type"], "nominal");
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            snapshot().to_string(),
            "processor=1, range=[3, 4], n_train=1, last=false"
        );
    }
}
