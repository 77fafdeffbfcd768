//! Run-length codec for serialized mazes
//!
//! The first [HEADER_LEN] bytes (the maze header) are copied as they are.
//! Every following byte is coded as `(count, value)` pairs, where `count` is
//! `1..=255`. Longer runs are split into several pairs, so 300 equal bytes
//! become `(255, v) (45, v)`.
//!
//! A decoder checks the expanded length against the cell count the header
//! declares. Headers that do not declare a valid maze shape are copied
//! without that check.
//!
//! [compress] and [decompress] work on in-memory buffers;
//! [CompressorWriter] and [DecompressorReader] wrap any [Write] sink or
//! [Read] source with the same format.

use std::io::{self, Read, Write};

use crate::error::{MazeError, Result};
use crate::maze::{Header, Maze3d, HEADER_LEN};

/// Longest run a single pair can describe
pub const MAX_RUN: u8 = u8::MAX;

/// Incremental encoder
#[derive(Debug, Default)]
struct Encoder {
    header_seen: usize,
    /// Open run as `(value, count)`
    run: Option<(u8, u8)>,
}

impl Encoder {
    fn feed(&mut self, mut input: &[u8], out: &mut Vec<u8>) {
        if self.header_seen < HEADER_LEN {
            let n = (HEADER_LEN - self.header_seen).min(input.len());
            out.extend_from_slice(&input[..n]);
            self.header_seen += n;
            input = &input[n..];
        }

        for &byte in input {
            self.run = match self.run {
                Some((value, count)) if value == byte && count < MAX_RUN => {
                    Some((value, count + 1))
                }
                Some((value, count)) => {
                    out.extend_from_slice(&[count, value]);
                    Some((byte, 1))
                }
                None => Some((byte, 1)),
            };
        }
    }

    /// Close the open run
    fn finish(&mut self, out: &mut Vec<u8>) {
        if let Some((value, count)) = self.run.take() {
            out.extend_from_slice(&[count, value]);
        }
    }
}

/// Incremental decoder
#[derive(Debug, Default)]
struct Decoder {
    header: Vec<u8>,
    /// Cell bytes declared by the header, once it is complete and valid
    expected: Option<usize>,
    body_len: usize,
    /// Count byte waiting for its value
    pending: Option<u8>,
}

impl Decoder {
    fn feed(&mut self, mut input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        if self.header.len() < HEADER_LEN {
            let n = (HEADER_LEN - self.header.len()).min(input.len());
            self.header.extend_from_slice(&input[..n]);
            out.extend_from_slice(&input[..n]);
            input = &input[n..];

            if self.header.len() == HEADER_LEN {
                self.expected = Header::parse(&self.header).and_then(|h| h.declared_cell_count());
            }
        }

        for &byte in input {
            match self.pending.take() {
                None if byte == 0 => {
                    return Err(MazeError::CorruptStream(format!(
                        "zero run length after {} cell bytes",
                        self.body_len
                    )))
                }
                None => self.pending = Some(byte),
                Some(count) => {
                    self.body_len += usize::from(count);
                    if let Some(expected) = self.expected.filter(|&e| self.body_len > e) {
                        return Err(MazeError::CorruptStream(format!(
                            "runs expand past the {} cell bytes declared by the header",
                            expected
                        )));
                    }
                    out.resize(out.len() + usize::from(count), byte);
                }
            }
        }
        Ok(())
    }

    /// Check that the stream ended on a pair boundary with the declared size
    fn finish(&self) -> Result<()> {
        if let Some(count) = self.pending {
            return Err(MazeError::CorruptStream(format!(
                "truncated pair: run length {} without value",
                count
            )));
        }
        match self.expected {
            Some(expected) if expected != self.body_len => {
                Err(MazeError::CorruptStream(format!(
                    "expanded to {} cell bytes, header declares {}",
                    self.body_len, expected
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Compress raw maze bytes
///
/// Never fails. Inputs shorter than the header are returned unchanged.
pub fn compress(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len().min(HEADER_LEN) + 2);
    let mut encoder = Encoder::default();
    encoder.feed(raw, &mut out);
    encoder.finish(&mut out);
    log::debug!("Compressed {} bytes into {}", raw.len(), out.len());
    out
}

/// Inverse of [compress]
///
/// Returns [MazeError::CorruptStream] on a truncated or zero-length pair,
/// or when the expanded length does not match the header.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(compressed.len());
    let mut decoder = Decoder::default();
    decoder.feed(compressed, &mut out)?;
    decoder.finish()?;
    log::debug!("Decompressed {} bytes into {}", compressed.len(), out.len());
    Ok(out)
}

/// Write-filter compressing everything written to it
///
/// Runs are only known to be complete when the next byte differs, so the
/// last run is written by [CompressorWriter::finish], or on drop.
#[derive(Debug)]
pub struct CompressorWriter<W: Write> {
    /// Only `None` inside `finish`, after the writer was handed back
    inner: Option<W>,
    encoder: Encoder,
    buf: Vec<u8>,
}

impl<W: Write> CompressorWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            encoder: Encoder::default(),
            buf: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        self.inner
            .as_ref()
            .expect("inner writer is present until finish")
    }

    /// Write the final run, flush and return the underlying writer
    pub fn finish(mut self) -> io::Result<W> {
        self.encoder.finish(&mut self.buf);
        self.flush()?;
        self.inner
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "compressor already finished"))
    }

    /// Move buffered output into the inner writer
    fn dump(&mut self) -> io::Result<()> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(());
        };
        while !self.buf.is_empty() {
            let n = inner.write(&self.buf)?;
            if n == 0 {
                return Err(io::ErrorKind::WriteZero.into());
            }
            self.buf.drain(..n);
        }
        Ok(())
    }
}

impl<W: Write> Write for CompressorWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.dump()?;
        self.encoder.feed(data, &mut self.buf);
        Ok(data.len())
    }

    /// Flush completed pairs. The open run stays buffered.
    fn flush(&mut self) -> io::Result<()> {
        self.dump()?;
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for CompressorWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            self.encoder.finish(&mut self.buf);
            if let Err(err) = self.dump() {
                log::warn!("Dropping {} compressed bytes: {}", self.buf.len(), err);
            }
        }
    }
}

/// Read-filter expanding a compressed source
///
/// Corruption is reported as [io::ErrorKind::InvalidData] carrying a
/// [MazeError::CorruptStream].
#[derive(Debug)]
pub struct DecompressorReader<R: Read> {
    inner: R,
    decoder: Decoder,
    chunk: Vec<u8>,
    out: Vec<u8>,
    pos: usize,
    eof: bool,
    /// First decoding error; every later read repeats it
    failed: Option<MazeError>,
}

impl<R: Read> DecompressorReader<R> {
    const CHUNK_LEN: usize = 4096;

    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decoder: Decoder::default(),
            chunk: vec![0; Self::CHUNK_LEN],
            out: Vec::new(),
            pos: 0,
            eof: false,
            failed: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for DecompressorReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = &self.failed {
            return Err(invalid_data(err.clone()));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.out.len() {
            if self.eof {
                return Ok(0);
            }
            self.out.clear();
            self.pos = 0;

            let n = self.inner.read(&mut self.chunk)?;
            let decoded = if n == 0 {
                self.eof = true;
                self.decoder.finish()
            } else {
                self.decoder.feed(&self.chunk[..n], &mut self.out)
            };
            if let Err(err) = decoded {
                self.out.clear();
                self.failed = Some(err.clone());
                return Err(invalid_data(err));
            }
        }

        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn invalid_data(err: MazeError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// Compress `maze` into `writer`, returning the writer once everything is
/// written
pub fn write_maze<W: Write>(maze: &Maze3d, writer: W) -> io::Result<W> {
    let mut compressor = CompressorWriter::new(writer);
    compressor.write_all(&maze.to_bytes())?;
    compressor.finish()
}

/// Read a compressed maze from `reader`
///
/// Decoding errors are [io::ErrorKind::InvalidData] carrying the
/// [MazeError].
pub fn read_maze<R: Read>(reader: R) -> io::Result<Maze3d> {
    let mut bytes = Vec::new();
    DecompressorReader::new(reader).read_to_end(&mut bytes)?;
    Maze3d::from_bytes(&bytes).map_err(invalid_data)
}
