//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::io::{ErrorKind, Read};

use crate::sans::{Error, check::Crc, cursor::Source};

use super::{DecodeOptions, Decoded, slots};

/// Decode the records of a document from a reader.
///
/// The reader is borrowed, and left positioned after the last byte decoded.
///
/// This method is also re-exported as `spoke::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(r: &mut impl Read, options: &DecodeOptions) -> Result<Decoded, Error> {
    slots::decode(&mut ReadSource::new(r), options)
}

/// A [`Source`] over a reader, counting the bytes taken from it.
#[derive(Debug)]
pub struct ReadSource<'a, R> {
    inner: &'a mut R,
    pos: usize,
    crc: Crc,
}

impl<'a, R: Read> ReadSource<'a, R> {
    pub fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            pos: 0,
            crc: Crc::new(),
        }
    }
}

impl<R: Read> Source for ReadSource<'_, R> {
    fn position(&self) -> usize {
        self.pos
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let mut read = 0;

        while read < buf.len() {
            match self.inner.read(&mut buf[read..]) {
                Ok(0) => Err(Error::StreamExhausted {
                    offset: self.pos,
                    needed: buf.len() - read,
                })?,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => Err(e)?,
            }
        }

        self.crc.update(buf);
        self.pos += buf.len();

        Ok(())
    }

    fn crc(&self) -> u16 {
        self.crc.value()
    }
}
