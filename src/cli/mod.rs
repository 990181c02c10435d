//! Command-line interface module.
//!
//! Argument parsing via clap.

mod args;

pub use args::{Args, DEFAULT_CAPTURE_FILE};
