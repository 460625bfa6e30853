//
// lib.rs
// Dicom-Tagfix
//
// Exposes the correction engine's modules and re-exports the CLI entry point for both binary
// and library consumers.
//

// Leaves first: codec and rendering, then scanning and matching, then the engine and its
// directory-level transaction.
pub mod cli;
pub mod codec;
pub mod correction;
pub mod detector;
pub mod error;
pub mod events;
pub mod exam_paths;
pub mod journal;
pub mod models;
pub mod predicate;
pub mod render;
pub mod scanner;
pub mod template;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use cli::{run as run_cli, Cli, Commands};
pub use error::{FixError, Result};
pub use events::{EventSink, FixEvent, RecordingSink, TracingSink};
pub use models::{FileRecord, FileStatus, RunOutcome, RunReport};
pub use transaction::{resume, run, FixOptions};
