//! pcapdump CLI entry point.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcapdump::cli::Args;
use pcapdump::dump::RecordDumper;
use pcapdump::pcap::PcapReader;

/// Exit status when the capture cannot be opened.
const EXIT_OPEN_FAILURE: u8 = 1;
/// Exit status when reading or dumping fails part way through.
const EXIT_STREAM_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr, stdout carries the dump
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()))
        .with_writer(io::stderr)
        .init();

    let mut reader = match PcapReader::open(&args.file)
        .with_context(|| format!("error reading pcap file: {}", args.file.display()))
    {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(EXIT_OPEN_FAILURE);
        }
    };

    let stdout = io::stdout();
    let mut dumper = RecordDumper::new(BufWriter::new(stdout.lock()), args.dump_options());

    match dumper.run(&mut reader) {
        Ok(processed) => {
            tracing::info!(processed, link_type = reader.link_type(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let processed = dumper.processed();
            tracing::debug!(processed, error = ?e, "dump failed");
            eprintln!("error after {processed} records: {e}");
            ExitCode::from(EXIT_STREAM_FAILURE)
        }
    }
}
