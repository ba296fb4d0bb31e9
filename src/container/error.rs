/// Errors that can occur while reading or writing an output container
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Error serializing/deserializing the manifest or group tree
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Error from the Arrow library while building or reading a dataset
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library while encoding or decoding a dataset
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// The file is not a valid output container
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    /// The container does not exist and the open mode requires it
    #[error("Container not found: {0}")]
    NotFound(String),

    /// A group or dataset with this name already exists
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    /// An attribute holds a value the container cannot store (NaN or infinity)
    #[error("Invalid attribute value: {0}")]
    InvalidValue(String),

    /// Group and dataset names must be non-empty and must not contain '/'
    #[error("Invalid object name: {0:?}")]
    InvalidName(String),
}
