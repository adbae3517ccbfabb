use crate::classifiers::bayes::partitioned::{DistributorError, ValidatedConfig};
use crate::core::buffers::BoundedBuffer;
use crate::core::events::{InstanceBatch, InstanceEvent, Phase};
use crate::core::instances::DenseInstance;
use log::{debug, info};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Destination of the batches a [`Distributor`] emits.
pub trait BatchSink {
    fn put(&mut self, batch: Arc<InstanceBatch>) -> Result<(), DistributorError>;
}

impl<F> BatchSink for F
where
    F: FnMut(Arc<InstanceBatch>) -> Result<(), DistributorError>,
{
    fn put(&mut self, batch: Arc<InstanceBatch>) -> Result<(), DistributorError> {
        self(batch)
    }
}

struct PhaseBuffer {
    phase: Phase,
    buffer: Arc<BoundedBuffer<DenseInstance>>,
    batch_size: usize,
    n_waiting: usize,
    n_submitted: u64,
    finished: bool,
}

impl PhaseBuffer {
    fn new(phase: Phase, batch_size: NonZeroUsize) -> Self {
        Self {
            phase,
            buffer: Arc::new(BoundedBuffer::new(batch_size)),
            batch_size: batch_size.get(),
            n_waiting: 0,
            n_submitted: 0,
            finished: false,
        }
    }

    fn next_batch(&self) -> InstanceBatch {
        let mut batch = InstanceBatch::with_capacity(self.phase, self.batch_size);
        for instance in self.buffer.drain_up_to(self.batch_size) {
            batch.add(instance);
        }
        batch
    }

    /// Sends everything still buffered, the last batch flagged terminal.
    /// Always emits exactly one terminal batch, possibly empty.
    fn flush_terminal(&mut self, sink: &mut dyn BatchSink) -> Result<(), DistributorError> {
        self.n_waiting = 0;
        let mut batch = self.next_batch();
        while !self.buffer.is_empty() {
            let tail = self.next_batch();
            sink.put(Arc::new(std::mem::replace(&mut batch, tail)))?;
        }
        batch.set_last(true);
        self.finished = true;
        info!("{} stream finished, flushing last batch", self.phase);
        debug!("sending {} batch of {} instances", self.phase, batch.len());
        sink.put(Arc::new(batch))
    }
}

/// Groups single instances into order-preserving batches.
///
/// Training and testing instances are buffered separately, each buffer
/// bounded by its batch size (testing batches are twice as large). A batch is
/// flushed once enough instances are waiting or when the last instance of a
/// stream arrives. Training batches go to `train_stream`, testing batches to
/// `test_stream`. A sink that blocks while its consumer is behind blocks
/// `submit` with it.
pub struct Distributor<T: BatchSink, S: BatchSink> {
    train: PhaseBuffer,
    test: PhaseBuffer,
    train_stream: T,
    test_stream: S,
}

impl<T: BatchSink, S: BatchSink> Distributor<T, S> {
    pub fn new(config: &ValidatedConfig, train_stream: T, test_stream: S) -> Self {
        info!(
            "Distributor created, batch_size={}, test_batch_size={}",
            config.batch_size, config.test_batch_size
        );
        Self {
            train: PhaseBuffer::new(Phase::Training, config.batch_size),
            test: PhaseBuffer::new(Phase::Testing, config.test_batch_size),
            train_stream,
            test_stream,
        }
    }

    /// Buffers one instance and forwards a batch when the flush condition is
    /// met.
    ///
    /// Blocks while the target buffer is full. An interrupted wait is fatal:
    /// the instance could not be buffered, so the error is returned instead
    /// of losing it silently.
    pub fn submit(&mut self, event: InstanceEvent) -> Result<(), DistributorError> {
        let InstanceEvent {
            instance,
            phase,
            is_last,
        } = event;
        let (state, sink) = self.route(phase);

        if state.finished {
            return Err(DistributorError::StreamFinished(phase));
        }

        state
            .buffer
            .put(instance)
            .map_err(|source| DistributorError::Interrupted { phase, source })?;
        state.n_waiting += 1;
        state.n_submitted += 1;

        if is_last {
            return state.flush_terminal(sink);
        }
        if state.n_waiting >= state.batch_size {
            state.n_waiting = 0;
            let batch = state.next_batch();
            debug!("sending {phase} batch of {} instances", batch.len());
            sink.put(Arc::new(batch))?;
        }
        Ok(())
    }

    /// Ends `phase` as if its last submitted instance had been flagged last.
    ///
    /// Waiting instances are flushed in order and the final batch carries the
    /// terminal flag. Does nothing when the stream already finished.
    pub fn flush_last(&mut self, phase: Phase) -> Result<(), DistributorError> {
        let (state, sink) = self.route(phase);
        if state.finished {
            return Ok(());
        }
        state.flush_terminal(sink)
    }

    fn route(&mut self, phase: Phase) -> (&mut PhaseBuffer, &mut dyn BatchSink) {
        match phase {
            Phase::Training => (&mut self.train, &mut self.train_stream),
            Phase::Testing => (&mut self.test, &mut self.test_stream),
        }
    }

    /// Handle that interrupts producers blocked in [`Distributor::submit`].
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            buffers: [Arc::clone(&self.train.buffer), Arc::clone(&self.test.buffer)],
        }
    }

    pub fn waiting(&self, phase: Phase) -> usize {
        match phase {
            Phase::Training => self.train.n_waiting,
            Phase::Testing => self.test.n_waiting,
        }
    }

    /// Instances accepted on `phase` so far.
    pub fn submitted(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Training => self.train.n_submitted,
            Phase::Testing => self.test.n_submitted,
        }
    }

    pub fn is_finished(&self, phase: Phase) -> bool {
        match phase {
            Phase::Training => self.train.finished,
            Phase::Testing => self.test.finished,
        }
    }
}

/// Closes the distributor buffers from another thread.
#[derive(Clone)]
pub struct Interrupter {
    buffers: [Arc<BoundedBuffer<DenseInstance>>; 2],
}

impl Interrupter {
    pub fn interrupt(&self) {
        for buffer in &self.buffers {
            buffer.close();
        }
    }
}
