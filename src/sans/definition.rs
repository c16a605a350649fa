//! Definition records and the field definitions they carry.

use alloc::vec::Vec;

use tracing::debug;
use zerocopy::FromBytes;

use super::{
    Error,
    base_type::BaseType,
    cursor::{Endian, Source, read_bits},
    data::DataRecord,
};

#[repr(C, packed)]
#[derive(FromBytes)]
struct FieldHeader {
    field: u8,
    size: u8,
    base_type: u8,
}

/// Layout of one fixed field within a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field number, interpreted by the profile of the global message.
    pub number: u8,
    /// Size of the field in bytes.
    pub size: u8,
    pub base_type: BaseType,
}

impl FieldDefinition {
    /// Decode a three-byte field definition.
    pub fn decode<S: Source>(s: &mut S) -> Result<Self, Error> {
        let offset = s.position();

        let FieldHeader {
            field,
            size,
            base_type,
        } = zerocopy::transmute!(s.take::<3>()?);

        let base_type = BaseType::from_byte(base_type).ok_or(Error::UnknownBaseType {
            offset: offset + 2,
            base_type,
        })?;

        Ok(Self {
            number: field,
            size,
            base_type,
        })
    }

    /// The base type number, without the endian-capability flag.
    pub fn base_type_number(&self) -> u8 {
        read_bits(self.base_type.byte(), 4, 0)
    }
}

/// Layout of one developer field within a data record.
///
/// The base type and name of a developer field come from a field description
/// decoded earlier in the document, see [`super::data::DeveloperRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevFieldDefinition {
    /// Field number within the developer's namespace.
    pub number: u8,
    /// Size of the field in bytes.
    pub size: u8,
    /// Developer data index naming the namespace.
    pub developer_index: u8,
}

impl DevFieldDefinition {
    /// Decode a three-byte developer field definition.
    pub fn decode<S: Source>(s: &mut S) -> Result<Self, Error> {
        let FieldHeader {
            field,
            size,
            base_type: developer_index,
        } = zerocopy::transmute!(s.take::<3>()?);

        Ok(Self {
            number: field,
            size,
            developer_index,
        })
    }
}

/// A schema bound to a local slot, and the data rows decoded under it.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionRecord {
    /// Ordinal of this definition among all records of the document.
    pub index: usize,
    pub local: u8,
    pub endian: Endian,
    pub global: u16,
    pub fields: Vec<FieldDefinition>,
    /// Empty unless the record header flagged developer data.
    pub developer_fields: Vec<DevFieldDefinition>,
    /// Rows decoded with exactly this schema, in document order.
    pub rows: Vec<DataRecord>,
}

impl DefinitionRecord {
    /// Decode the body of a definition record, after its header byte.
    pub fn decode<S: Source>(
        s: &mut S,
        local: u8,
        developer: bool,
        index: usize,
    ) -> Result<Self, Error> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct DefinitionMessage {
            _reserved: u8,
            architecture: u8,
            global_message: [u8; 2],
            fields_remaining: u8,
        }

        let DefinitionMessage {
            architecture,
            global_message,
            fields_remaining,
            ..
        } = zerocopy::transmute!(s.take::<5>()?);

        let endian = Endian::from_architecture(architecture);
        let global = endian.u16(global_message);

        let fields = (0..fields_remaining)
            .map(|_| FieldDefinition::decode(s))
            .collect::<Result<Vec<_>, _>>()?;

        let developer_fields = if developer {
            let [count] = s.take()?;
            (0..count)
                .map(|_| DevFieldDefinition::decode(s))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        debug!(
            local,
            global,
            ?endian,
            fields = fields.len(),
            developer_fields = developer_fields.len(),
            "decoded definition"
        );

        Ok(Self {
            index,
            local,
            endian,
            global,
            fields,
            developer_fields,
            rows: Vec::new(),
        })
    }
}
