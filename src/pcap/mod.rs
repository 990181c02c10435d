//! PCAP file reading module.
//!
//! This module handles reading PCAP and PCAPNG files and
//! exposing their records for dumping.
//!
//! The main types are:
//! - [`PcapReader`] - File-based reader with gzip handling
//! - [`CaptureRecord`] - One record with its metadata and owned bytes
//! - [`Timestamp`] - Seconds plus microseconds capture time

mod reader;
mod record;
mod timestamp;

pub use reader::{is_gzip_extension, PcapReader};
pub use record::CaptureRecord;
pub use timestamp::Timestamp;
