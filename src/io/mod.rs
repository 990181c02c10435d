//! Record I/O abstractions.
//!
//! [`RecordSource`] is the pull interface the dump driver consumes. It is
//! implemented by [`crate::pcap::PcapReader`] for capture files and by
//! [`VecRecordSource`] for records already held in memory.

mod source;

pub use source::{RecordSource, VecRecordSource};
