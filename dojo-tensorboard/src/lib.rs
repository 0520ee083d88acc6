//! Recorder writing records to TensorBoard event files.
use dojo_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::trace;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes scalars in records to TFRecord.
///
/// [`Recorder::write`] uses the scalar with the key `step_key` (default `"step"`)
/// as the global step, or the number of records written so far if the record
/// does not have it. [`AggregateRecorder::flush`] writes the values aggregated
/// with [`RecordStorage`] at the given step.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    storage: RecordStorage,
    step_key: String,
    n_writes: usize,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            storage: RecordStorage::new(),
            step_key: "step".to_string(),
            n_writes: 0,
        }
    }

    /// Set the key of the global step in written records.
    pub fn step_key(mut self, v: impl Into<String>) -> Self {
        self.step_key = v.into();
        self
    }

    fn write_at(&mut self, record: &Record, step: usize) {
        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                _ => trace!("Skipped non-scalar value of {}", k),
            }
        }
        self.writer.flush();
    }
}

impl Recorder for TensorboardRecorder {
    /// Write scalars in the given [`Record`] into a TFRecord.
    ///
    /// Other variants of [`RecordValue`] are ignored.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => self.n_writes,
        };
        self.write_at(&record, step);
        self.n_writes += 1;
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        self.write_at(&record, step.max(0) as usize);
    }
}
