//! PCAP file reader.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError, PcapNGReader};

use super::{CaptureRecord, Timestamp};
use crate::error::{Error, PcapError as OurPcapError};

/// Initial buffer size for reading PCAP files (64KB).
const BUFFER_SIZE: usize = 65536;

/// Largest parser buffer a single record may grow it to (256MB).
const MAX_BUFFER_SIZE: usize = 256 * 1024 * 1024;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

type Stream = BufReader<Box<dyn Read + Send>>;

/// Reader for PCAP and PCAPNG files, with optional gzip decompression.
///
/// The reader owns the open file until the container is exhausted or a read
/// fails; both are terminal and release the handle right away.
///
/// ```no_run
/// use pcapdump::pcap::PcapReader;
///
/// fn main() -> pcapdump::Result<()> {
///     let mut reader = PcapReader::open("capture.pcap.gz")?;
///     while let Some(record) = reader.next_record()? {
///         println!("{} {} bytes", record.timestamp, record.data.len());
///     }
///     Ok(())
/// }
/// ```
pub struct PcapReader {
    state: ReaderState,
    frames: FrameState,
}

enum ReaderState {
    Open(ReaderInner),
    Exhausted,
    Failed,
}

enum ReaderInner {
    Legacy(LegacyPcapReader<Stream>),
    Ng(PcapNGReader<Stream>),
}

/// Bookkeeping shared by both container flavours.
struct FrameState {
    frame_number: u64,
    link_type: u16,
    nanosecond: bool,
    buffer_size: usize,
}

impl PcapReader {
    /// Open a PCAP file for reading.
    ///
    /// Automatically detects and decompresses gzipped files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();

        let is_gzipped = is_gzip_file(path)?;

        // Peek at magic number to determine PCAP format
        let mut buf_reader = open_stream(path, is_gzipped)?;
        let mut magic = [0u8; 4];
        buf_reader.read_exact(&mut magic).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::Pcap(OurPcapError::InvalidFormat {
                reason: "File too short to read magic number".to_string(),
            }),
            _ => open_error(path, e),
        })?;

        // Re-open file since we consumed the magic bytes
        drop(buf_reader);
        let buf_reader = open_stream(path, is_gzipped)?;

        let inner = match &magic {
            // PCAP, micro or nanosecond, either byte order
            [0xd4, 0xc3, 0xb2, 0xa1]
            | [0xa1, 0xb2, 0xc3, 0xd4]
            | [0x4d, 0x3c, 0xb2, 0xa1]
            | [0xa1, 0xb2, 0x3c, 0x4d] => open_legacy(buf_reader)?,
            // PCAPNG
            [0x0a, 0x0d, 0x0d, 0x0a] => open_ng(buf_reader)?,
            _ => {
                return Err(Error::Pcap(OurPcapError::InvalidFormat {
                    reason: format!("Unknown magic number: {magic:02x?}"),
                }))
            }
        };

        tracing::debug!(
            path = %path.display(),
            gzip = is_gzipped,
            pcapng = matches!(inner, ReaderInner::Ng(_)),
            "opened capture container"
        );

        Ok(Self {
            state: ReaderState::Open(inner),
            frames: FrameState {
                frame_number: 0,
                link_type: 1, // Default to Ethernet, updated from the header
                nanosecond: false,
                buffer_size: BUFFER_SIZE,
            },
        })
    }

    /// Get the link type of the capture.
    pub fn link_type(&self) -> u16 {
        self.frames.link_type
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frames.frame_number
    }

    /// Whether the reader reached the end of the container.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, ReaderState::Exhausted)
    }

    /// Whether the reader failed and will yield no more records.
    pub fn is_failed(&self) -> bool {
        matches!(self.state, ReaderState::Failed)
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at end of file, and keeps doing so on later calls.
    /// After an error every later call returns [`OurPcapError::ReaderFailed`].
    pub fn next_record(&mut self) -> Result<Option<CaptureRecord>, Error> {
        let pulled = match &mut self.state {
            ReaderState::Open(ReaderInner::Legacy(reader)) => next_legacy(reader, &mut self.frames),
            ReaderState::Open(ReaderInner::Ng(reader)) => next_ng(reader, &mut self.frames),
            ReaderState::Exhausted => return Ok(None),
            ReaderState::Failed => return Err(Error::Pcap(OurPcapError::ReaderFailed)),
        };

        match pulled {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                tracing::debug!(frames = self.frames.frame_number, "end of capture");
                self.state = ReaderState::Exhausted;
                Ok(None)
            }
            Err(e) => {
                self.state = ReaderState::Failed;
                Err(Error::Pcap(e))
            }
        }
    }
}

/// Map an I/O failure on the container file to an open error.
fn open_error(path: &Path, e: io::Error) -> Error {
    let path = path.display().to_string();
    match e.kind() {
        ErrorKind::NotFound => Error::Pcap(OurPcapError::FileNotFound { path }),
        _ => Error::Pcap(OurPcapError::Open { path, source: e }),
    }
}

fn open_stream(path: &Path, is_gzipped: bool) -> Result<Stream, Error> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;

    let reader: Box<dyn Read + Send> = if is_gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    Ok(BufReader::with_capacity(BUFFER_SIZE, reader))
}

fn open_legacy(reader: Stream) -> Result<ReaderInner, Error> {
    let pcap_reader = LegacyPcapReader::new(BUFFER_SIZE, reader).map_err(|e| {
        Error::Pcap(OurPcapError::InvalidFormat {
            reason: format!("Failed to parse PCAP header: {e}"),
        })
    })?;
    Ok(ReaderInner::Legacy(pcap_reader))
}

fn open_ng(reader: Stream) -> Result<ReaderInner, Error> {
    let pcap_reader = PcapNGReader::new(BUFFER_SIZE, reader).map_err(|e| {
        Error::Pcap(OurPcapError::InvalidFormat {
            reason: format!("Failed to parse PCAPNG header: {e}"),
        })
    })?;
    Ok(ReaderInner::Ng(pcap_reader))
}

fn next_legacy(
    reader: &mut LegacyPcapReader<Stream>,
    frames: &mut FrameState,
) -> Result<Option<CaptureRecord>, OurPcapError> {
    loop {
        match reader.next() {
            Ok((offset, block)) => match block {
                PcapBlockOwned::Legacy(packet) => {
                    frames.frame_number += 1;

                    let timestamp = if frames.nanosecond {
                        Timestamp::from_nanos_fraction(i64::from(packet.ts_sec), packet.ts_usec)
                    } else {
                        Timestamp::new(i64::from(packet.ts_sec), packet.ts_usec)
                    };

                    let record = build_record(
                        frames.frame_number,
                        timestamp,
                        packet.caplen,
                        packet.origlen,
                        packet.data,
                    );

                    reader.consume(offset);
                    return record.map(Some);
                }
                PcapBlockOwned::LegacyHeader(header) => {
                    frames.link_type = header.network.0 as u16;
                    frames.nanosecond = matches!(header.magic_number, 0xa1b2_3c4d | 0x4d3c_b2a1);
                    reader.consume(offset);
                    continue;
                }
                _ => {
                    reader.consume(offset);
                    continue;
                }
            },
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::BufferTooSmall) => {
                grow_buffer(reader, frames)?;
                continue;
            }
            Err(PcapError::Incomplete(_)) => {
                if reader.reader_exhausted() {
                    return Err(truncated_container(frames.frame_number));
                }
                reader.refill().map_err(|e| OurPcapError::Read {
                    frame: frames.frame_number,
                    reason: format!("Refill error: {e}"),
                })?;
                continue;
            }
            Err(e) => {
                return Err(OurPcapError::Read {
                    frame: frames.frame_number,
                    reason: format!("Parse error: {e}"),
                })
            }
        }
    }
}

fn next_ng(
    reader: &mut PcapNGReader<Stream>,
    frames: &mut FrameState,
) -> Result<Option<CaptureRecord>, OurPcapError> {
    use pcap_parser::pcapng::Block;

    loop {
        match reader.next() {
            Ok((offset, PcapBlockOwned::NG(ng_block))) => match ng_block {
                Block::InterfaceDescription(idb) => {
                    frames.link_type = idb.linktype.0 as u16;
                    reader.consume(offset);
                    continue;
                }
                Block::EnhancedPacket(epb) => {
                    frames.frame_number += 1;

                    // Interface default resolution is microseconds
                    let ts = (u64::from(epb.ts_high) << 32) | u64::from(epb.ts_low);
                    let record = build_record(
                        frames.frame_number,
                        Timestamp::from_micros(ts as i64),
                        epb.caplen,
                        epb.origlen,
                        epb.data,
                    );

                    reader.consume(offset);
                    return record.map(Some);
                }
                Block::SimplePacket(spb) => {
                    frames.frame_number += 1;

                    // Block data is padded to 32 bits; origlen bounds the payload
                    let len = spb.data.len().min(spb.origlen as usize);
                    let record = build_record(
                        frames.frame_number,
                        Timestamp::default(), // No timestamp in simple packets
                        len as u32,
                        spb.origlen,
                        spb.data,
                    );

                    reader.consume(offset);
                    return record.map(Some);
                }
                _ => {
                    reader.consume(offset);
                    continue;
                }
            },
            Ok((offset, _)) => {
                tracing::warn!("skipping non-PCAPNG block in PCAPNG stream");
                reader.consume(offset);
                continue;
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::BufferTooSmall) => {
                grow_buffer(reader, frames)?;
                continue;
            }
            Err(PcapError::Incomplete(_)) => {
                if reader.reader_exhausted() {
                    return Err(truncated_container(frames.frame_number));
                }
                reader.refill().map_err(|e| OurPcapError::Read {
                    frame: frames.frame_number,
                    reason: format!("Refill error: {e}"),
                })?;
                continue;
            }
            Err(e) => {
                return Err(OurPcapError::Read {
                    frame: frames.frame_number,
                    reason: format!("Parse error: {e}"),
                })
            }
        }
    }
}

/// Copy a record's bytes out of the parser buffer, checking its lengths.
///
/// `data` may carry block padding past `captured_length`; that tail is dropped.
fn build_record(
    frame_number: u64,
    timestamp: Timestamp,
    captured_length: u32,
    original_length: u32,
    data: &[u8],
) -> Result<CaptureRecord, OurPcapError> {
    if captured_length > original_length {
        return Err(OurPcapError::InvalidRecord {
            frame: frame_number,
            captured: captured_length,
            original: original_length,
        });
    }

    let expected = captured_length as usize;
    if data.len() < expected {
        return Err(OurPcapError::TruncatedPacket {
            frame: frame_number,
            expected,
            actual: data.len(),
        });
    }

    Ok(CaptureRecord::new(
        frame_number,
        timestamp,
        captured_length,
        original_length,
        data[..expected].to_vec(),
    ))
}

/// Double the parser buffer so the next record fits.
fn grow_buffer<R: PcapReaderIterator>(
    reader: &mut R,
    frames: &mut FrameState,
) -> Result<(), OurPcapError> {
    let new_size = frames.buffer_size * 2;
    if new_size > MAX_BUFFER_SIZE || !reader.grow(new_size) {
        return Err(OurPcapError::Read {
            frame: frames.frame_number,
            reason: format!(
                "record does not fit in a {} byte buffer",
                frames.buffer_size
            ),
        });
    }
    tracing::debug!(buffer_size = new_size, "grew parser buffer");
    frames.buffer_size = new_size;
    Ok(())
}

fn truncated_container(frame: u64) -> OurPcapError {
    OurPcapError::Read {
        frame,
        reason: "container ends in the middle of a record".to_string(),
    }
}

/// Check if a file is gzipped by extension or magic bytes.
fn is_gzip_file<P: AsRef<Path>>(path: P) -> Result<bool, Error> {
    let path = path.as_ref();

    if is_gzip_extension(path) {
        return Ok(true);
    }

    let mut file = File::open(path).map_err(|e| open_error(path, e))?;

    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false), // Too short to be gzipped
        Err(e) => Err(open_error(path, e)),
    }
}

/// Check if a path appears to be a gzip file by extension only.
pub fn is_gzip_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|f| f.to_str())
        .map(|name| name.to_lowercase().ends_with(".gz"))
        .unwrap_or(false)
}

/// Iterator adapter for PcapReader.
impl Iterator for PcapReader {
    type Item = Result<CaptureRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
