//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::dump::{DumpOptions, DumpTarget, DEFAULT_RECORD_LIMIT};

/// Capture file opened when none is given on the command line.
pub const DEFAULT_CAPTURE_FILE: &str = "trace-1.pcap";

/// Dump packet capture records as hex + ASCII.
#[derive(Parser, Debug)]
#[command(name = "pcapdump")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// PCAP/PCAPNG file to dump (optionally gzipped)
    #[arg(value_name = "FILE", default_value = DEFAULT_CAPTURE_FILE)]
    pub file: PathBuf,

    /// Maximum number of records to dump
    #[arg(short = 'n', long = "count", default_value_t = DEFAULT_RECORD_LIMIT)]
    pub count: usize,

    /// Which bytes of each record to dump
    #[arg(long = "target", value_enum, default_value = "payload")]
    pub target: DumpTarget,

    /// Number of bytes to dump per record (defaults to all selected bytes)
    #[arg(short = 'l', long = "length", value_name = "BYTES", allow_negative_numbers = true)]
    pub length: Option<i64>,

    /// Fixed label printed above every dump
    #[arg(long = "label")]
    pub label: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Dump settings selected by these arguments.
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            limit: self.count,
            target: self.target,
            length: self.length,
            label: self.label.clone(),
        }
    }

    /// Log filter directive for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
