//! pcapdump - Render packet capture records as hex + ASCII dumps.
//!
//! This library reads records from PCAP/PCAPNG files (optionally gzipped)
//! and formats their bytes into the classic 16-bytes-per-line diagnostic
//! view.
//!
//! # Example
//!
//! ```no_run
//! use pcapdump::dump::{DumpOptions, RecordDumper};
//! use pcapdump::pcap::PcapReader;
//!
//! fn main() -> pcapdump::Result<()> {
//!     let mut reader = PcapReader::open("trace-1.pcap")?;
//!     let mut dumper = RecordDumper::new(std::io::stdout(), DumpOptions::default());
//!     let processed = dumper.run(&mut reader)?;
//!     eprintln!("{processed} records");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod dump;
pub mod error;
pub mod format;
pub mod io;
pub mod pcap;

pub use error::{Error, Result};
