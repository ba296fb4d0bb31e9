use crate::container::ContainerError;
use crate::source::SourceError;

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Error loading the source recording
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// Error reading or writing the output container
    #[error("Container error: {0}")]
    ContainerError(#[from] ContainerError),

    /// Error compiling the recording-date pattern
    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    /// The source file name does not start with a YYYY-MM-DD recording date
    #[error("Source file name does not start with a recording date (YYYY-MM-DD): {0}")]
    InvalidFilename(String),

    /// A group the operation depends on is missing from the container
    #[error("Output container is missing group {0}")]
    MissingGroup(String),

    /// Two epochs map to the same output group
    #[error("Duplicate epoch key {0}")]
    DuplicateEpochKey(String),

    /// The spike detector reported refractory violations but no spikes
    #[error("Spike detector returned a violation index without spikes for epoch {epoch}")]
    OrphanViolationIndex {
        /// Source path of the epoch
        epoch: String,
    },
}
