//! Error types for the AGX reader and the USD writer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for reading AGX streams and authoring USD stages.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid AGX file: expected AGX magic bytes")]
    InvalidMagic,

    /// Unsupported file format version
    #[error("Unsupported AGX version: {0}")]
    UnsupportedVersion(u32),

    /// File is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Value type does not match the declared attribute type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Prim not found by path
    #[error("Prim not found: {0}")]
    PrimNotFound(String),

    /// Malformed prim path or prim name
    #[error("Invalid prim path: {0}")]
    InvalidPath(String),

    /// Output file format cannot be written
    #[error("Unsupported output format: {0} (expected .usda or .usd)")]
    UnsupportedFormat(PathBuf),

    /// Binary crate layers are not written
    #[error("Binary .usdc output is not supported: {0} (write a .usda file instead)")]
    BinaryLayerUnsupported(PathBuf),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;
