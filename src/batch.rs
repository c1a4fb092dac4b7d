//! Batch tagging of an image directory.
//!
//! The runner walks the input directory once, in sorted order, and tags each
//! image through a `TaggingService`. Results are written as `<stem>.txt`
//! sidecar files; failures go to an append-only error log.

mod error;
mod error_log;
mod report;
mod runner;
mod scanner;

pub use error::TaggerError;
pub use error_log::{ErrorLog, format_entry};
pub use report::RunStats;
pub use runner::{BatchTagger, ImageOutcome, RunOutcome, no_images_message};
pub use scanner::{ensure_output_dir, list_images};
