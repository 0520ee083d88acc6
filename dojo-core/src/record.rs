//! Types and traits for recording values during training and evaluation.
//!
//! * [`Record`] - A container of key-value pairs
//! * [`RecordValue`] - Types of values stored in a [`Record`]
//! * [`Recorder`], [`AggregateRecorder`] - Destinations of records
//! * [`RecordStorage`] - Aggregation of stored records
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`NullRecorder`] - Discards all records
//!
//! ```rust
//! use dojo_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(1.0));
//! record.insert("return", RecordValue::Scalar(-200.0));
//! record.insert("obs", RecordValue::Array1(vec![-0.5, 0.0]));
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
