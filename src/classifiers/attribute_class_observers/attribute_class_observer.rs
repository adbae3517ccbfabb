pub trait AttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64);

    /// Total weight this observer has folded into its statistics, missing
    /// values excluded.
    fn total_weight_observed(&self) -> f64;
}
