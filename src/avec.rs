//! Convenience interfaces for decoding whole documents.
//!
//! The functions in this module read a document's record stream into
//! [`DefinitionRecord`]s, each holding the raw rows decoded under it. Pass
//! the result to a [`crate::message::Assembler`] to obtain named messages.
//!
//! ```
//! let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default())?;
//! let activity = Assembler::new(&profile, &DecodeOptions::default()).assemble(&decoded);
//! ```

use alloc::vec::Vec;

use chrono::{FixedOffset, Offset, Utc};

use crate::{
    diagnostic::Diagnostic,
    sans::{definition::DefinitionRecord, header::FileHeader},
};

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;
pub mod slots;

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

/// Settings shared by decoding and assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Check the header and file check values, failing on a mismatch.
    pub verify_crc: bool,
    /// Subtract profile offsets after scaling.
    pub apply_offset: bool,
    /// Zone in which `local_date_time` fields were recorded.
    pub local_offset: FixedOffset,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_crc: false,
            apply_offset: true,
            local_offset: Utc.fix(),
        }
    }
}

impl DecodeOptions {
    pub fn verify_crc(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }

    pub fn apply_offset(mut self, apply_offset: bool) -> Self {
        self.apply_offset = apply_offset;
        self
    }

    pub fn local_offset(mut self, local_offset: FixedOffset) -> Self {
        self.local_offset = local_offset;
        self
    }
}

/// The raw contents of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub header: FileHeader,
    /// Every definition of the document, in the order they were finalized:
    /// redefined slots as they were replaced, then all remaining slots.
    pub definitions: Vec<DefinitionRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Decoded {
    /// Number of data rows across all definitions.
    pub fn row_count(&self) -> usize {
        self.definitions.iter().map(|d| d.rows.len()).sum()
    }
}
