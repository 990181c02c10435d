//! Byte formatting for diagnostic output.
//!
//! Provides the hex + ASCII dump used to display record bytes:
//! - [`DumpRequest`] - what to dump and how many bytes
//! - [`render`] - the dump algorithm
//! - [`HexDump`] - the rendered lines

mod hexdump;

pub use hexdump::{printable, render, DumpRequest, HexDump, BYTES_PER_LINE, PLACEHOLDER};
