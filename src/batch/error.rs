use std::path::PathBuf;

use thiserror::Error;

use crate::gradio::GradioError;

/// Errors raised while running a tagging batch.
///
/// `Predict` and `WriteOutput` are per-image failures that the runner records
/// and moves past. The remaining variants abort the run.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// The remote service failed to tag an image
    #[error(transparent)]
    Predict(#[from] GradioError),

    /// The sidecar file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input directory could not be listed
    #[error("Failed to list input directory {}: {source}", path.display())]
    ListImages {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote service could not be reached
    #[error("Connection failed: {0}")]
    Connection(#[source] GradioError),
}
