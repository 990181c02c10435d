//! Record source abstraction and an in-memory implementation.

use std::collections::VecDeque;

use crate::error::Error;
use crate::pcap::{CaptureRecord, PcapReader};

/// Sequential reader of capture records.
///
/// Implementations return `Ok(None)` once the source is exhausted and must
/// keep returning it on later calls.
pub trait RecordSource {
    /// Read the next record.
    fn next_record(&mut self) -> Result<Option<CaptureRecord>, Error>;
}

impl RecordSource for PcapReader {
    #[inline]
    fn next_record(&mut self) -> Result<Option<CaptureRecord>, Error> {
        PcapReader::next_record(self)
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    #[inline]
    fn next_record(&mut self) -> Result<Option<CaptureRecord>, Error> {
        (**self).next_record()
    }
}

/// Record source backed by records already in memory.
#[derive(Debug, Default, Clone)]
pub struct VecRecordSource {
    records: VecDeque<CaptureRecord>,
}

impl VecRecordSource {
    /// Create a source that yields `records` in order.
    pub fn new(records: Vec<CaptureRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Number of records not yet read.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for VecRecordSource {
    fn next_record(&mut self) -> Result<Option<CaptureRecord>, Error> {
        Ok(self.records.pop_front())
    }
}
