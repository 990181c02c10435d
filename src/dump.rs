//! Record dump driver.
//!
//! Pulls records from a [`RecordSource`], renders each one with
//! [`crate::format::render`] and writes the result to a sink.

use std::io::Write;

use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::format::{render, DumpRequest};
use crate::io::RecordSource;
use crate::pcap::CaptureRecord;

/// Default number of records dumped per run.
pub const DEFAULT_RECORD_LIMIT: usize = 20;

/// Which bytes of a record to dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DumpTarget {
    /// The captured packet bytes
    #[default]
    Payload,
    /// The 16-byte record header (timestamp and lengths)
    Header,
}

/// Settings for a dump run.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Maximum number of records to dump.
    pub limit: usize,
    pub target: DumpTarget,
    /// Requested dump length; `None` dumps all selected bytes.
    pub length: Option<i64>,
    /// Fixed label printed above every dump instead of the per-record one.
    pub label: Option<String>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECORD_LIMIT,
            target: DumpTarget::Payload,
            length: None,
            label: None,
        }
    }
}

/// Writes one dump block per record to `out`.
pub struct RecordDumper<W: Write> {
    out: W,
    options: DumpOptions,
    processed: usize,
}

impl<W: Write> RecordDumper<W> {
    pub fn new(out: W, options: DumpOptions) -> Self {
        Self {
            out,
            options,
            processed: 0,
        }
    }

    /// Records dumped so far, including those written before a failure.
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Dump records until the limit is reached or the source runs dry, then
    /// write the status line.
    ///
    /// Returns the number of records dumped. The first failure ends the run;
    /// output for earlier records has already been written and flushed.
    pub fn run<S: RecordSource>(&mut self, source: &mut S) -> Result<usize> {
        while self.processed < self.options.limit {
            let record = match source.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    self.out.flush()?;
                    return Err(e);
                }
            };

            if let Err(e) = self.dump_record(&record) {
                self.out.flush()?;
                return Err(Error::AtRecord {
                    frame: record.frame_number,
                    timestamp: record.timestamp.to_string(),
                    source: Box::new(e),
                });
            }
            self.processed += 1;
        }

        if self.processed < self.options.limit {
            tracing::debug!(processed = self.processed, "capture exhausted before limit");
        }

        writeln!(self.out, "{}", status_line(self.processed))?;
        self.out.flush()?;
        Ok(self.processed)
    }

    /// Render and write a single record.
    pub fn dump_record(&mut self, record: &CaptureRecord) -> Result<()> {
        let header;
        let bytes: &[u8] = match self.options.target {
            DumpTarget::Payload => &record.data,
            DumpTarget::Header => {
                header = record.header_bytes();
                &header
            }
        };

        let label = match &self.options.label {
            Some(label) => label.clone(),
            None => default_label(record),
        };

        let mut request = DumpRequest::new(bytes).with_label(&label);
        if let Some(length) = self.options.length {
            request = request.with_length(length);
        }

        let dump = render(&request)?;
        tracing::trace!(frame = record.frame_number, lines = dump.lines().len(), "rendered record");
        write!(self.out, "{dump}")?;
        Ok(())
    }
}

/// `packet <n> at <timestamp>, <caplen> of <origlen> bytes`
pub fn default_label(record: &CaptureRecord) -> String {
    format!(
        "packet {} at {}, {} of {} bytes",
        record.frame_number, record.timestamp, record.captured_length, record.original_length
    )
}

/// The trailing line reporting how many records were dumped.
pub fn status_line(processed: usize) -> String {
    if processed == 1 {
        "1 record processed".to_string()
    } else {
        format!("{processed} records processed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DumpError, PcapError};
    use crate::io::VecRecordSource;
    use crate::pcap::Timestamp;

    fn record(frame: u64, data: &[u8]) -> CaptureRecord {
        CaptureRecord::new(
            frame,
            Timestamp::new(1_000 + frame as i64, 5),
            data.len() as u32,
            data.len() as u32,
            data.to_vec(),
        )
    }

    fn run_to_string(source: &mut impl RecordSource, options: DumpOptions) -> (Result<usize>, String) {
        let mut dumper = RecordDumper::new(Vec::new(), options);
        let result = dumper.run(source);
        let text = String::from_utf8(dumper.into_inner()).unwrap();
        (result, text)
    }

    /// Fails after yielding `good` records.
    struct FailingSource {
        good: VecRecordSource,
    }

    impl RecordSource for FailingSource {
        fn next_record(&mut self) -> Result<Option<CaptureRecord>> {
            match self.good.next_record()? {
                Some(r) => Ok(Some(r)),
                None => Err(Error::Pcap(PcapError::Read {
                    frame: 2,
                    reason: "disk on fire".to_string(),
                })),
            }
        }
    }

    #[test]
    fn test_dumps_all_records_under_limit() {
        let mut source = VecRecordSource::new(vec![record(1, b"one"), record(2, b"two"), record(3, b"three")]);
        let (result, text) = run_to_string(&mut source, DumpOptions::default());

        assert_eq!(result.unwrap(), 3);
        assert!(text.contains("packet 1 at 1001.000005, 3 of 3 bytes:\n"));
        assert!(text.contains("packet 3 at 1003.000005, 5 of 5 bytes:\n"));
        assert!(text.ends_with("3 records processed\n"));
    }

    #[test]
    fn test_stops_at_limit() {
        let mut source = VecRecordSource::new((1..=30).map(|i| record(i, b"x")).collect());
        let options = DumpOptions {
            limit: 20,
            ..Default::default()
        };
        let (result, text) = run_to_string(&mut source, options);

        assert_eq!(result.unwrap(), 20);
        assert_eq!(source.remaining(), 10);
        assert!(text.contains("packet 20 at"));
        assert!(!text.contains("packet 21 at"));
    }

    #[test]
    fn test_records_in_order() {
        let mut source = VecRecordSource::new((1..=4).map(|i| record(i, b"x")).collect());
        let (_, text) = run_to_string(&mut source, DumpOptions::default());

        let positions: Vec<usize> = (1..=4)
            .map(|i| text.find(&format!("packet {i} at")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_source() {
        let mut source = VecRecordSource::default();
        let (result, text) = run_to_string(&mut source, DumpOptions::default());
        assert_eq!(result.unwrap(), 0);
        assert_eq!(text, "0 records processed\n");
    }

    #[test]
    fn test_header_target() {
        let mut source = VecRecordSource::new(vec![record(1, b"abc")]);
        let options = DumpOptions {
            target: DumpTarget::Header,
            label: Some("my_str".to_string()),
            ..Default::default()
        };
        let (_, text) = run_to_string(&mut source, options);

        // ts 1001.000005, caplen 3, origlen 3
        assert!(text.starts_with(
            "my_str:\n  0000  e9 03 00 00 05 00 00 00 03 00 00 00 03 00 00 00  ................\n"
        ));
        assert!(text.ends_with("1 record processed\n"));
    }

    #[test]
    fn test_length_override_edges() {
        let mut source = VecRecordSource::new(vec![record(1, b"abc")]);
        let options = DumpOptions {
            length: Some(-3),
            ..Default::default()
        };
        let (_, text) = run_to_string(&mut source, options);
        assert!(text.contains("  NEGATIVE LENGTH: -3\n"));

        let mut source = VecRecordSource::new(vec![record(1, b"abc")]);
        let options = DumpOptions {
            length: Some(0),
            ..Default::default()
        };
        let (_, text) = run_to_string(&mut source, options);
        assert!(text.contains("  ZERO LENGTH\n"));
    }

    #[test]
    fn test_out_of_bounds_ends_run_with_timestamp() {
        let mut source = VecRecordSource::new(vec![record(1, b"abcdef"), record(2, b"ab")]);
        let options = DumpOptions {
            length: Some(4),
            ..Default::default()
        };
        let mut dumper = RecordDumper::new(Vec::new(), options);
        let err = dumper.run(&mut source).unwrap_err();

        assert_eq!(dumper.processed(), 1);
        match &err {
            Error::AtRecord { frame, timestamp, source } => {
                assert_eq!(*frame, 2);
                assert_eq!(timestamp, "1002.000005");
                assert!(matches!(
                    **source,
                    Error::Dump(DumpError::OutOfBounds {
                        requested: 4,
                        available: 2
                    })
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("1002.000005"));

        let text = String::from_utf8(dumper.into_inner()).unwrap();
        assert!(text.contains("packet 1 at"));
        assert!(!text.contains("records processed"));
    }

    #[test]
    fn test_read_error_keeps_earlier_output() {
        let mut source = FailingSource {
            good: VecRecordSource::new(vec![record(1, b"ok")]),
        };
        let mut dumper = RecordDumper::new(Vec::new(), DumpOptions::default());
        let err = dumper.run(&mut source).unwrap_err();

        assert!(!err.is_open_error());
        assert_eq!(dumper.processed(), 1);
        let text = String::from_utf8(dumper.into_inner()).unwrap();
        assert!(text.starts_with("packet 1 at"));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(0), "0 records processed");
        assert_eq!(status_line(1), "1 record processed");
        assert_eq!(status_line(3), "3 records processed");
    }
}
