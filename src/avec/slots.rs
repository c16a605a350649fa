//! The decode loop, binding local slots to definitions.

use alloc::vec::Vec;

use either::Either::{Left, Right};
use tracing::{debug, warn};

use crate::{
    diagnostic::Diagnostic,
    sans::{
        Error,
        check::compute_crc,
        cursor::{Limit, Source},
        data::{DataRecord, DeveloperRegistry, FIELD_DESCRIPTION},
        definition::DefinitionRecord,
        header::{DocumentHeaderError, FileHeader, RecordHeader},
    },
};

use super::{DecodeOptions, Decoded};

/// Decode every record of a document from a source.
///
/// Decoding ends once the number of record bytes declared by the file header
/// has been read. A record extending past that point fails with
/// [`Error::StreamExhausted`]. The trailing check value is only read when
/// [`DecodeOptions::verify_crc`] is set.
pub fn decode<S: Source>(s: &mut S, options: &DecodeOptions) -> Result<Decoded, Error> {
    let header = FileHeader::decode(s)?;

    if !header.valid_marker {
        Err(DocumentHeaderError::NotFitData)?;
    }

    if options.verify_crc {
        if let Some(found) = header.crc.filter(|c| *c != 0) {
            let calculated = compute_crc(&header_bytes(&header));
            if found != calculated {
                Err(Error::CyclicRedundancyCheck { found, calculated })?;
            }
        }
    }

    let end = header.payload_end(); // Offset to the end of the record section.
    let mut slots = SlotTable::new();
    let mut records = Limit::new(s, end);

    while records.position() < end {
        let offset = records.position();
        let [byte] = records.take()?;

        let record = RecordHeader::decode(byte, offset)?;

        match record.kind {
            Left(definition) => slots.define(&mut records, record.local, definition.developer)?,
            Right(data) => slots.data(&mut records, record.local, data.time_offset, offset)?,
        }
    }

    let (definitions, diagnostics) = slots.finish();

    if options.verify_crc {
        let calculated = s.crc();
        let found = u16::from_le_bytes(s.take()?);

        if found != calculated {
            Err(Error::CyclicRedundancyCheck { found, calculated })?;
        }
    }

    Ok(Decoded {
        header,
        definitions,
        diagnostics,
    })
}

/// Bytes covered by the header check value.
fn header_bytes(header: &FileHeader) -> [u8; 12] {
    let mut r = [0; 12];
    r[0] = header.header_size;
    r[1] = header.protocol_version;
    r[2..4].copy_from_slice(&header.profile_version.to_le_bytes());
    r[4..8].copy_from_slice(&header.data_size.to_le_bytes());
    r[8..12].copy_from_slice(b".FIT");
    r
}

/// Definitions bound to each local slot, and those already replaced.
#[derive(Debug, Default)]
pub struct SlotTable {
    table: [Option<DefinitionRecord>; 16],
    finished: Vec<DefinitionRecord>,
    registry: DeveloperRegistry,
    diagnostics: Vec<Diagnostic>,
    records: usize,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a definition record body and bind it to `local`.
    ///
    /// A definition already bound to the slot is finalized first, so rows of
    /// two schemas are never mixed.
    pub fn define<S: Source>(
        &mut self,
        s: &mut S,
        local: u8,
        developer: bool,
    ) -> Result<(), Error> {
        let definition = DefinitionRecord::decode(s, local, developer, self.records)?;
        self.records += 1;

        if let Some(previous) = self.table[local as usize].replace(definition) {
            debug!(
                local,
                global = previous.global,
                rows = previous.rows.len(),
                "local message redefined"
            );
            self.finished.push(previous);
        }

        Ok(())
    }

    /// Decode a data record body with the schema bound to `local`.
    ///
    /// `offset` is the position of the record header, used for error
    /// reporting.
    pub fn data<S: Source>(
        &mut self,
        s: &mut S,
        local: u8,
        time_offset: Option<u8>,
        offset: usize,
    ) -> Result<(), Error> {
        let Some(definition) = self.table[local as usize].as_mut() else {
            return Err(Error::UnboundSlot { offset, local });
        };

        let row = DataRecord::decode(
            s,
            definition,
            &self.registry,
            time_offset,
            self.records,
            &mut self.diagnostics,
        )?;

        if row.global == FIELD_DESCRIPTION && self.registry.register(&row).is_none() {
            let record = self.records;

            warn!(record, "incomplete field description");
            self.diagnostics.push(Diagnostic::InvalidDescription { record });
        }

        self.records += 1;
        definition.rows.push(row);

        Ok(())
    }

    /// Finalize all remaining bindings, returning every definition and the
    /// diagnostics collected along the way.
    pub fn finish(mut self) -> (Vec<DefinitionRecord>, Vec<Diagnostic>) {
        self.finished.extend(self.table.into_iter().flatten());

        (self.finished, self.diagnostics)
    }
}
