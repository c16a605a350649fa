//! Byte-level reads from a document.

use alloc::{string::String, vec, vec::Vec};

use super::{Error, check::Crc};

/// A source of document bytes that tracks its offset.
///
/// Every byte handed out is also accumulated into a running cyclic
/// redundancy check.
pub trait Source {
    /// Offset of the next byte, from the start of the document.
    fn position(&self) -> usize;

    /// Fill a buffer completely, or fail with [`Error::StreamExhausted`].
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error>;

    /// Check value over all bytes read so far.
    fn crc(&self) -> u16;

    /// Take an exact number of bytes.
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Take a run of bytes whose length is only known at runtime.
    fn take_vec(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

/// A [`Source`] over a slice holding a whole document.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    crc: Crc,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            crc: Crc::new(),
        }
    }
}

impl Source for Cursor<'_> {
    fn position(&self) -> usize {
        self.pos
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let end = self.pos + buf.len();
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or_else(|| Error::StreamExhausted {
                offset: self.pos,
                needed: end - self.data.len(),
            })?;

        buf.copy_from_slice(bytes);
        self.crc.update(bytes);
        self.pos = end;

        Ok(())
    }

    fn crc(&self) -> u16 {
        self.crc.value()
    }
}

/// A [`Source`] that refuses reads past a fixed offset.
///
/// Used to keep records within the record section declared by the file
/// header, so that no record reads into the trailing check value.
#[derive(Debug)]
pub struct Limit<'s, S> {
    inner: &'s mut S,
    end: usize,
}

impl<'s, S: Source> Limit<'s, S> {
    pub fn new(inner: &'s mut S, end: usize) -> Self {
        Self { inner, end }
    }
}

impl<S: Source> Source for Limit<'_, S> {
    fn position(&self) -> usize {
        self.inner.position()
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let offset = self.inner.position();
        let end = offset + buf.len();

        if end > self.end {
            return Err(Error::StreamExhausted {
                offset,
                needed: end - self.end,
            });
        }

        self.inner.fill(buf)
    }

    fn crc(&self) -> u16 {
        self.inner.crc()
    }
}

/// Byte order of multi-byte values, fixed per definition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Interpret a definition record's architecture byte.
    pub fn from_architecture(architecture: u8) -> Self {
        if architecture == 0 {
            Self::Little
        } else {
            Self::Big
        }
    }

    pub fn u16(self, r: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(r),
            Self::Big => u16::from_be_bytes(r),
        }
    }
}

/// Read `total` bytes as a run of `width`-byte elements.
///
/// Fails with [`Error::Framing`] (before consuming anything) if `total` does
/// not divide evenly.
pub fn read_repeated<S: Source, T>(
    s: &mut S,
    total: usize,
    width: usize,
    element: impl FnMut(&[u8]) -> T,
) -> Result<Vec<T>, Error> {
    if width == 0 || total % width != 0 {
        Err(Error::Framing {
            offset: s.position(),
            size: total,
            width,
        })?;
    }

    let bytes = s.take_vec(total)?;

    Ok(bytes.chunks_exact(width).map(element).collect())
}

/// Read a text field spanning `span` bytes, ending at the first NUL.
pub fn read_null_terminated<S: Source>(s: &mut S, span: usize) -> Result<String, Error> {
    let bytes = s.take_vec(span)?;
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());

    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Extract bits `high` down to `low` (inclusive) of a byte, where bit 7 is
/// the most significant.
pub fn read_bits(byte: u8, high: u8, low: u8) -> u8 {
    debug_assert!(high >= low && high < 8);

    let width = high - low + 1;
    let mask = ((1u16 << width) - 1) as u8;

    (byte >> low) & mask
}
