pub mod attribute_class_observers;
pub mod bayes;
