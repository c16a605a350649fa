//! Document and record headers.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use zerocopy::FromBytes;

use super::{
    Error,
    cursor::{Source, read_bits},
};

/// An error decoding a document header.
#[derive(Debug, thiserror::Error)]
pub enum DocumentHeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
}

/// The header at the start of every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes following the header, excluding the trailing
    /// check value.
    pub data_size: u32,
    /// Whether the `.FIT` marker was found.
    pub valid_marker: bool,
    /// Check value over the first twelve header bytes, if the header carries
    /// one. Zero means the writer did not compute it.
    pub crc: Option<u16>,
}

impl FileHeader {
    /// Decode a document header from the start of a source.
    pub fn decode<S: Source>(s: &mut S) -> Result<Self, Error> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: [u8; 2],
            data_size: [u8; 4],
            data_type: [u8; 4],
        }

        let RawHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(s.take::<12>()?);

        let crc = match header_size {
            14 => Some(u16::from_le_bytes(s.take()?)),
            12 => None,
            _ => Err(DocumentHeaderError::UnknownHeaderLength(header_size))?,
        };

        Ok(Self {
            header_size,
            protocol_version,
            profile_version: u16::from_le_bytes(profile_version),
            data_size: u32::from_le_bytes(data_size),
            valid_marker: &data_type == b".FIT",
            crc,
        })
    }

    /// Offset one past the last record byte.
    pub fn payload_end(&self) -> usize {
        self.header_size as usize + self.data_size as usize
    }
}

/// Header of a definition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionHeader {
    /// Whether developer field definitions follow the fixed ones.
    pub developer: bool,
}

/// Header of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// Time offset of a compressed timestamp header.
    pub time_offset: Option<u8>,
}

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Local slot the record refers to (0 to 15).
    pub local: u8,
    pub kind: Either<DefinitionHeader, DataHeader>,
}

impl RecordHeader {
    /// Decode the one-byte header starting a record.
    ///
    /// `offset` is the position of the byte, used for error reporting.
    pub fn decode(r: u8, offset: usize) -> Result<Self, Error> {
        bitfield! {
            struct Control(u8) {
                [7] is_compressed,
            }
        }

        if Control(r).is_compressed() {
            // Compressed timestamp headers have no reserved bits.
            let local = read_bits(r, 6, 5);
            let time_offset = read_bits(r, 4, 0);

            return Ok(Self {
                local,
                kind: Right(DataHeader {
                    time_offset: Some(time_offset),
                }),
            });
        }

        bitfield! {
            struct NormalHeader(u8) {
                [0..4] local_message: u8,
                [4] is_reserved,
                [5] is_developer,
                [6] is_definition,
            }
        }

        let header = NormalHeader(r);

        let malformed = header.is_reserved() || (!header.is_definition() && header.is_developer());
        if malformed {
            Err(Error::MalformedHeader { offset, header: r })?;
        }

        let kind = if header.is_definition() {
            Left(DefinitionHeader {
                developer: header.is_developer(),
            })
        } else {
            Right(DataHeader { time_offset: None })
        };

        Ok(Self {
            local: header.local_message(),
            kind,
        })
    }
}
