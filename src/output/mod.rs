//! Local output layout for downloaded log objects

pub mod path;

pub use path::DestinationPath;

/// Output layout errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// URL path cannot be mapped to a file beneath the destination
    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
