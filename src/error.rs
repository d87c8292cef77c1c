//! Error kinds raised by the region pipeline.
//!
//! All errors are raised synchronously where they are detected; no stage
//! returns partial output alongside an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AltreError {
    /// A numeric argument is out of range or thresholds are misordered.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The TSS reference holds no intervals.
    #[error("TSS reference is empty")]
    EmptyReference,
    /// A results table lacks required columns or samples.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Attribute columns do not align with the declared schema.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AltreError>;
