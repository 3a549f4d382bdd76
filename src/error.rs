//! Error types and Result alias

use thiserror::Error;

/// Result type alias for ATX operations
pub type Result<T> = std::result::Result<T, AtxError>;

/// Errors that can occur when loading ATX images or addressing drives
#[derive(Debug, Error)]
pub enum AtxError {
    /// I/O error occurred while opening or reading the image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the ATX signature
    #[error("Invalid signature: {found:02X?}")]
    InvalidSignature {
        /// The four bytes found at the start of the file
        found: [u8; 4],
    },

    /// File header declares a version this library does not read
    #[error("Unsupported ATX version {version} (minimum {min_version})")]
    UnsupportedVersion {
        /// Format version
        version: u16,
        /// Minimum version required to read the image
        min_version: u16,
    },

    /// File is shorter than a file header
    #[error("Truncated header: expected {expected} bytes, read {read}")]
    TruncatedHeader {
        /// Size of the header in bytes
        expected: usize,
        /// Bytes actually available
        read: usize,
    },

    /// Drive slot outside the supported range
    #[error("Invalid drive {drive} (max: {max})")]
    InvalidDrive {
        /// Requested drive slot
        drive: usize,
        /// Highest valid drive slot
        max: usize,
    },

    /// No image is loaded in the drive
    #[error("No image loaded in drive {drive}")]
    NoImage {
        /// Drive slot
        drive: usize,
    },

    /// Binary record could not be decoded
    #[error("Parse error at offset {offset}: {message}")]
    ParseError {
        /// Byte offset where error occurred
        offset: u64,
        /// Error message
        message: String,
    },
}

impl AtxError {
    /// Create a parse error with context
    pub fn parse<S: Into<String>>(offset: u64, message: S) -> Self {
        AtxError::ParseError {
            offset,
            message: message.into(),
        }
    }

    /// True for the errors that mean the image itself cannot be used
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            AtxError::InvalidSignature { .. }
                | AtxError::UnsupportedVersion { .. }
                | AtxError::TruncatedHeader { .. }
                | AtxError::ParseError { .. }
        )
    }
}
