use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};

/// Buffered recorder.
///
/// Written records are kept in memory as they are. Stored records are
/// aggregated with [`RecordStorage`] on flush, and the aggregated record
/// is kept with the key `"step"`. Useful in tests and for inspecting
/// training runs programmatically.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns the number of buffered records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut record = self.storage.aggregate();
        record.insert("step", RecordValue::Scalar(step as f32));
        self.buf.push(record);
    }
}
