use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use crate::streams::Stream;
use crate::testing::dummies::header_binary;
use std::io::Error;
use std::sync::Arc;

pub struct VecStream {
    pub header: Arc<InstanceHeader>,
    pub rows: Vec<Vec<f64>>,
    idx: usize,
}

impl VecStream {
    pub fn new(header: Arc<InstanceHeader>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            header,
            rows,
            idx: 0,
        }
    }

    /// Class-only instances over [`header_binary`].
    pub fn from_labels(labels: Vec<usize>) -> Self {
        Self::new(
            header_binary(),
            labels.into_iter().map(|y| vec![y as f64]).collect(),
        )
    }
}

impl Stream for VecStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.idx < self.rows.len()
    }

    fn next_instance(&mut self) -> Option<DenseInstance> {
        let values = self.rows.get(self.idx)?.clone();
        self.idx += 1;
        Some(DenseInstance::with_default_weight(
            Arc::clone(&self.header),
            values,
        ))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.idx = 0;
        Ok(())
    }
}
