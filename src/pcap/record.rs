//! Capture record representation.

use super::Timestamp;

/// One record pulled from a capture container.
///
/// `data.len()` always equals `captured_length`, which never exceeds
/// `original_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    /// Frame number (1-indexed).
    pub frame_number: u64,

    /// Capture time.
    pub timestamp: Timestamp,

    /// Captured length (may be less than original).
    pub captured_length: u32,

    /// Original length on the wire.
    pub original_length: u32,

    /// Raw record bytes.
    pub data: Vec<u8>,
}

impl CaptureRecord {
    /// Create a new record.
    pub fn new(
        frame_number: u64,
        timestamp: Timestamp,
        captured_length: u32,
        original_length: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            frame_number,
            timestamp,
            captured_length,
            original_length,
            data,
        }
    }

    /// Check if the packet was truncated during capture.
    pub fn is_truncated(&self) -> bool {
        self.captured_length < self.original_length
    }

    /// The record header as it is laid out in a little-endian legacy PCAP
    /// file: seconds, microseconds, captured length, original length.
    pub fn header_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&(self.timestamp.secs as u32).to_le_bytes());
        out[4..8].copy_from_slice(&self.timestamp.micros.to_le_bytes());
        out[8..12].copy_from_slice(&self.captured_length.to_le_bytes());
        out[12..16].copy_from_slice(&self.original_length.to_le_bytes());
        out
    }
}
