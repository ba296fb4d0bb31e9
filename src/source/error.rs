/// Errors that can occur while loading a source recording
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error while reading the recording
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The recording export is not valid JSON for the Symphony hierarchy
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// An epoch ends before it starts
    #[error("Epoch {path} ends ({end}) before it starts ({start})")]
    InvalidEpochInterval {
        /// Source path of the offending epoch
        path: String,
        /// Recorded start timestamp
        start: String,
        /// Recorded end timestamp
        end: String,
    },
}
