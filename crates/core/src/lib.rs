//! Batch pipeline and CSV I/O for askglean.

pub mod csv_io;
pub mod pipeline;

pub use csv_io::{output_path_for, read_records, write_records};
pub use pipeline::{AnswerProvider, ProgressReporter, RunSummary, SilentProgress, run};
