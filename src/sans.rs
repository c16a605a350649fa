//! Building blocks of the record stream decoder.
//!
//! This module is intended for applications that need fine control over
//! decoder internals. See [`crate::avec`] for the decode loop built on top of
//! it.
//!
//! # Architecture
//!
//! A document is a file header, followed by a stream of records, followed by
//! a cyclic redundancy check. Each record starts with a one-byte header naming
//! a local slot (0 to 15). Definition records bind a schema (global message
//! number, architecture, field layout) to their slot; data records are laid
//! out according to whatever schema their slot is currently bound to.
//!
//! All reads go through a [`cursor::Source`], which tracks the document
//! offset so that structural failures can report where they happened.
//!
//! Some areas of the decoding process are not represented here and must be
//! carefully written by callers:
//!
//! - Keeping the slot table, and flushing a slot's definition when it is
//! redefined.
//!
//! - Ending decoding once the specified number of document bytes have been
//! read.
//!
//! - Applying cyclic redundancy checks. A helper is provided in the [`check`]
//! module.

use thiserror::Error;

pub mod base_type;
pub mod check;
pub mod cursor;
pub mod data;
pub mod definition;
pub mod header;

use header::DocumentHeaderError;

/// A structural error, fatal to the decode in progress.
///
/// Offsets are counted in bytes from the start of the document.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes remain than a read requires.
    #[error("Stream exhausted at offset {offset} ({needed} more bytes needed).")]
    StreamExhausted { offset: usize, needed: usize },
    /// An error from the supplied reader.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Incorrect file header.
    #[error("Incorrect file header: {0}")]
    Header(#[from] DocumentHeaderError),
    /// A record header with reserved bits set.
    #[error("Malformed record header ({header:#04x}) at offset {offset}.")]
    MalformedHeader { offset: usize, header: u8 },
    /// A data record for a local slot with no definition.
    #[error("Data record at offset {offset} references undefined local message {local}.")]
    UnboundSlot { offset: usize, local: u8 },
    /// A field definition naming a base type outside the catalog.
    #[error("Unknown base type ({base_type:#04x}) at offset {offset}.")]
    UnknownBaseType { offset: usize, base_type: u8 },
    /// A field whose size is not a multiple of its base type's width.
    #[error("Field of {size} bytes at offset {offset} does not divide into {width}-byte elements.")]
    Framing {
        offset: usize,
        size: usize,
        width: usize,
    },
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
}
