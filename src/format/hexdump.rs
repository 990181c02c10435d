//! Hex + ASCII dump rendering.
//!
//! Produces the classic diagnostic layout, 16 bytes per line:
//!
//! ```text
//!   0000  45 00 00 1c 00 01 00 00 40 11 7c cd c0 a8 01 64  E.......@.|....d
//!   0010  41 00 7f                                         A..
//! ```

use std::fmt;

use crate::error::DumpError;

/// Number of bytes rendered on each line.
pub const BYTES_PER_LINE: usize = 16;

/// Character shown in the ASCII column for non-printable bytes.
pub const PLACEHOLDER: char = '.';

/// A request to dump `requested_len` bytes of `data`.
///
/// `requested_len` is signed on purpose: zero and negative lengths are valid
/// requests that render a single diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpRequest<'a> {
    pub label: Option<&'a str>,
    pub data: &'a [u8],
    pub requested_len: i64,
}

impl<'a> DumpRequest<'a> {
    /// Request a dump of the whole buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            label: None,
            data,
            requested_len: data.len() as i64,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_length(mut self, requested_len: i64) -> Self {
        self.requested_len = requested_len;
        self
    }
}

/// A rendered dump: an optional label and the dump lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexDump {
    label: Option<String>,
    lines: Vec<String>,
}

impl HexDump {
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The dump lines, without the label line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Renders the label as `<label>:` followed by one dump line per text line.
impl fmt::Display for HexDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            writeln!(f, "{label}:")?;
        }
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Render a hex + ASCII dump of the request.
///
/// Never reads past `data`: a request for more bytes than the buffer holds
/// fails with [`DumpError::OutOfBounds`] before anything is rendered.
///
/// # Example
///
/// ```
/// use pcapdump::format::{render, DumpRequest};
///
/// let dump = render(&DumpRequest::new(b"Hi\n")).unwrap();
/// assert_eq!(dump.lines().len(), 1);
/// assert!(dump.lines()[0].ends_with("  Hi."));
/// ```
pub fn render(request: &DumpRequest<'_>) -> Result<HexDump, DumpError> {
    let label = request.label.map(str::to_owned);

    if request.requested_len == 0 {
        return Ok(HexDump {
            label,
            lines: vec!["  ZERO LENGTH".to_string()],
        });
    }
    if request.requested_len < 0 {
        return Ok(HexDump {
            label,
            lines: vec![format!("  NEGATIVE LENGTH: {}", request.requested_len)],
        });
    }

    let available = request.data.len();
    let requested = usize::try_from(request.requested_len).unwrap_or(usize::MAX);
    if requested > available {
        return Err(DumpError::OutOfBounds {
            requested,
            available,
        });
    }

    let lines = request.data[..requested]
        .chunks(BYTES_PER_LINE)
        .enumerate()
        .map(|(i, chunk)| render_line(i * BYTES_PER_LINE, chunk))
        .collect();

    Ok(HexDump { label, lines })
}

fn render_line(offset: usize, chunk: &[u8]) -> String {
    let mut line = String::with_capacity(8 + BYTES_PER_LINE * 4 + 2);
    let mut ascii = String::with_capacity(BYTES_PER_LINE);

    line.push_str(&format!("  {offset:04x} "));
    for &byte in chunk {
        line.push_str(&format!(" {byte:02x}"));
        ascii.push(printable(byte));
    }
    for _ in chunk.len()..BYTES_PER_LINE {
        line.push_str("   ");
    }
    line.push_str("  ");
    line.push_str(&ascii);
    line
}

/// The ASCII column character for `byte`: itself in 0x20..=0x7e, else `.`.
pub fn printable(byte: u8) -> char {
    if (0x20..=0x7e).contains(&byte) {
        byte as char
    } else {
        PLACEHOLDER
    }
}
