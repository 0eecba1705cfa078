//! Output
//!
//! Snapshot collection and the CSV logging collaborator.

pub mod logger;
pub mod snapshot;

pub use logger::{CsvLogger, EpochSink, LoggerError, DEFAULT_OUTPUT_DIR};
pub use snapshot::{collect_epoch_snapshot, collect_layout};
