//! Error types for pcapdump.
//!
//! - [`enum@Error`] - Main error enum that wraps all error types
//! - [`PcapError`] - Errors from opening and reading capture containers
//! - [`DumpError`] - Errors from rendering a hex dump

use thiserror::Error;

/// Main error type for pcapdump operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error opening or reading a capture container
    #[error("PCAP error: {0}")]
    Pcap(#[from] PcapError),

    /// Error rendering a dump
    #[error("Dump error: {0}")]
    Dump(#[from] DumpError),

    /// A failure tied to one record of the capture
    #[error("packet {frame} with timestamp {timestamp}: {source}")]
    AtRecord {
        frame: u64,
        timestamp: String,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error happened while opening the container, before any
    /// record was produced.
    pub fn is_open_error(&self) -> bool {
        match self {
            Error::Pcap(e) => e.is_open_error(),
            Error::AtRecord { source, .. } => source.is_open_error(),
            _ => false,
        }
    }
}

/// Errors related to PCAP file reading.
#[derive(Error, Debug)]
pub enum PcapError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// File exists but could not be opened or read
    #[error("Cannot read {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid PCAP format
    #[error("Invalid PCAP format: {reason}")]
    InvalidFormat { reason: String },

    /// Failure while pulling records from an open container
    #[error("Read error after frame {frame}: {reason}")]
    Read { frame: u64, reason: String },

    /// Truncated packet
    #[error("Truncated packet at frame {frame}: expected {expected} bytes, got {actual}")]
    TruncatedPacket {
        frame: u64,
        expected: usize,
        actual: usize,
    },

    /// Record header that contradicts itself
    #[error("Invalid record at frame {frame}: captured length {captured} exceeds original length {original}")]
    InvalidRecord {
        frame: u64,
        captured: u32,
        original: u32,
    },

    /// The reader hit an error earlier and produces nothing more
    #[error("Reader already failed, no further records")]
    ReaderFailed,
}

impl PcapError {
    /// Whether this error belongs to the open phase of the container.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            PcapError::FileNotFound { .. }
                | PcapError::Open { .. }
                | PcapError::InvalidFormat { .. }
        )
    }
}

/// Errors related to hex dump rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DumpError {
    /// Requested more bytes than the buffer holds
    #[error("requested {requested} bytes but only {available} are available")]
    OutOfBounds { requested: usize, available: usize },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
