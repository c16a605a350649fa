//! Data records and the fields they carry.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use tracing::{trace, warn};

use super::{
    Error,
    base_type::{BaseType, RawValue},
    cursor::{Endian, Source, read_null_terminated, read_repeated},
    definition::DefinitionRecord,
};
use crate::diagnostic::Diagnostic;

/// Global message number of developer field descriptions.
pub const FIELD_DESCRIPTION: u16 = 206;

/// A decoded field value and whether it held a value at all.
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    pub base_type: BaseType,
    pub value: RawValue,
    /// False if the field held its base type's 'invalid' marker (for arrays,
    /// if every element did).
    pub valid: bool,
    /// Units given by a developer field description.
    pub units: Option<String>,
}

impl DataField {
    /// Decode a field of `size` bytes.
    ///
    /// Fields spanning more than one element of their base type decode as
    /// arrays; `string` fields decode as text over their whole span.
    pub fn decode<S: Source>(
        s: &mut S,
        base_type: BaseType,
        size: u8,
        endian: Endian,
    ) -> Result<Self, Error> {
        let size = size as usize;
        let width = base_type.width();

        let value = if base_type == BaseType::String {
            RawValue::Text(read_null_terminated(s, size)?)
        } else if size == width {
            base_type.decode(&s.take_vec(size)?, endian)
        } else {
            let items = read_repeated(s, size, width, |r| base_type.decode(r, endian))?;
            RawValue::Array(items)
        };

        Ok(Self {
            base_type,
            valid: !base_type.is_invalid(&value),
            value,
            units: None,
        })
    }
}

/// Identity of a field within a data record.
///
/// Fixed fields are numbered by the profile; developer fields live in an
/// open namespace and are known by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Fixed(u8),
    Developer(String),
}

/// One row of data, decoded under the schema bound to its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    /// Ordinal of this record among all records of the document.
    pub index: usize,
    pub global: u16,
    /// Time offset carried by a compressed timestamp header.
    pub time_offset: Option<u8>,
    pub fields: BTreeMap<FieldKey, DataField>,
}

impl DataRecord {
    /// Decode the body of a data record, after its header byte.
    ///
    /// Developer fields that cannot be resolved against `registry` are
    /// skipped and reported to `diagnostics`.
    pub fn decode<S: Source>(
        s: &mut S,
        definition: &DefinitionRecord,
        registry: &DeveloperRegistry,
        time_offset: Option<u8>,
        index: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self, Error> {
        let endian = definition.endian;
        let mut fields = BTreeMap::new();

        for f in &definition.fields {
            let field = DataField::decode(s, f.base_type, f.size, endian)?;
            fields.insert(FieldKey::Fixed(f.number), field);
        }

        for f in &definition.developer_fields {
            let offset = s.position();

            let Some(description) = registry.resolve(f.developer_index, f.number) else {
                s.take_vec(f.size as usize)?;

                warn!(
                    offset,
                    developer_index = f.developer_index,
                    number = f.number,
                    "unresolved developer field"
                );
                diagnostics.push(Diagnostic::FieldResolution {
                    offset,
                    developer_index: f.developer_index,
                    number: f.number,
                });
                continue;
            };

            let mut field = DataField::decode(s, description.base_type, f.size, endian)?;
            field.units.clone_from(&description.units);
            fields.insert(FieldKey::Developer(description.name.clone()), field);
        }

        trace!(index, global = definition.global, fields = fields.len(), "decoded data");

        Ok(Self {
            index,
            global: definition.global,
            time_offset,
            fields,
        })
    }

    /// A fixed field, if present and valid.
    pub fn valid_field(&self, number: u8) -> Option<&RawValue> {
        self.fields
            .get(&FieldKey::Fixed(number))
            .filter(|f| f.valid)
            .map(|f| &f.value)
    }
}

/// A developer field, as described by a field description row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperField {
    pub name: String,
    pub base_type: BaseType,
    pub units: Option<String>,
}

/// Developer field descriptions seen so far in a document, keyed by
/// developer data index and field number.
#[derive(Debug, Clone, Default)]
pub struct DeveloperRegistry(BTreeMap<(u8, u8), DeveloperField>);

impl DeveloperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the description carried by a `field_description` row.
    ///
    /// Returns the key it was registered under, or `None` if the row lacks
    /// an index, number, known base type or name.
    pub fn register(&mut self, row: &DataRecord) -> Option<(u8, u8)> {
        let byte = |n: u8| match row.valid_field(n)? {
            RawValue::U8(x) => Some(*x),
            _ => None,
        };
        let text = |n: u8| match row.valid_field(n)? {
            RawValue::Text(s) => Some(s.clone()),
            _ => None,
        };

        let developer_index = byte(0)?;
        let number = byte(1)?;
        let base_type = BaseType::from_byte(byte(2)?)?;
        let name = text(3)?;
        let units = text(8);

        trace!(developer_index, number, %name, "registered developer field");

        let key = (developer_index, number);
        self.0.insert(
            key,
            DeveloperField {
                name,
                base_type,
                units,
            },
        );

        Some(key)
    }

    pub fn resolve(&self, developer_index: u8, number: u8) -> Option<&DeveloperField> {
        self.0.get(&(developer_index, number))
    }
}
