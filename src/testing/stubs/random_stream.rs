use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use crate::streams::Stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Error;
use std::sync::Arc;

const NOMINAL_VALUES: [&str; 3] = ["v0", "v1", "v2"];

/// Unbounded seeded stream. Even feature indices are nominal with three
/// categories, odd ones numeric; the class attribute comes last.
pub struct RandomStream {
    seed: u64,
    rng: StdRng,
    header: Arc<InstanceHeader>,
    number_of_classes: usize,
}

impl RandomStream {
    pub fn new(number_of_features: usize, number_of_classes: usize, seed: u64) -> Self {
        let labels: Vec<String> = (0..number_of_classes).map(|j| format!("c{j}")).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        let mut attributes: Vec<Attribute> = (0..number_of_features)
            .map(|i| {
                if i % 2 == 0 {
                    Attribute::nominal(format!("nom{i}"), &NOMINAL_VALUES)
                } else {
                    Attribute::numeric(format!("num{i}"))
                }
            })
            .collect();
        attributes.push(Attribute::nominal("class", &label_refs));

        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            header: Arc::new(InstanceHeader::new(
                "random".into(),
                attributes,
                number_of_features,
            )),
            number_of_classes,
        }
    }
}

impl Stream for RandomStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        true
    }

    fn next_instance(&mut self) -> Option<DenseInstance> {
        let class = self.rng.random_range(0..self.number_of_classes);
        let mut values: Vec<f64> = (0..self.header.number_of_attributes() - 1)
            .map(|i| {
                if i % 2 == 0 {
                    self.rng.random_range(0..NOMINAL_VALUES.len()) as f64
                } else {
                    class as f64 * 10.0 + self.rng.random_range(-1.0..1.0)
                }
            })
            .collect();
        values.push(class as f64);
        Some(DenseInstance::with_default_weight(
            Arc::clone(&self.header),
            values,
        ))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        Ok(())
    }
}
