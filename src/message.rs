//! Assembly of decoded rows into named messages.
//!
//! Rows are grouped by global message number across every definition that
//! used it, then each valid field known to the [`Dictionary`] is converted
//! into a [`Value`]. Fields the dictionary does not know, and fields whose
//! conversion fails, are left out of the output and reported as
//! [`Diagnostic`]s. Unknown fields are reported once per message, with the
//! number of rows they were dropped from.

use alloc::{
    collections::BTreeMap,
    string::String,
    vec::Vec,
};

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, warn};

use crate::{
    avec::{DecodeOptions, Decoded},
    diagnostic::Diagnostic,
    profile::{Dictionary, FieldTable},
    sans::{
        base_type::RawValue,
        data::{DataRecord, FieldKey},
    },
};

pub mod special;
pub mod transform;

pub use transform::TransformError;

/// A field value after semantic processing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    /// The name of an enumeration value.
    Enum(String),
    DateTime(DateTime<Utc>),
    LocalDateTime(DateTime<FixedOffset>),
    Array(Vec<Value>),
}

impl Value {
    /// The value as a non-negative integer, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Unsigned(x) => Some(x),
            Self::Signed(x) => u64::try_from(x).ok(),
            _ => None,
        }
    }

    /// The value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Unsigned(x) => Some(x as f64),
            Self::Signed(x) => Some(x as f64),
            Self::Float(x) => Some(x),
            _ => None,
        }
    }
}

impl From<&RawValue> for Value {
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::U8(x) => Self::Unsigned(*x as u64),
            RawValue::U16(x) => Self::Unsigned(*x as u64),
            RawValue::U32(x) => Self::Unsigned(*x as u64),
            RawValue::U64(x) => Self::Unsigned(*x),
            RawValue::I8(x) => Self::Signed(*x as i64),
            RawValue::I16(x) => Self::Signed(*x as i64),
            RawValue::I32(x) => Self::Signed(*x as i64),
            RawValue::I64(x) => Self::Signed(*x),
            RawValue::F32(x) => Self::Float(*x as f64),
            RawValue::F64(x) => Self::Float(*x),
            RawValue::Text(s) => Self::Text(s.clone()),
            RawValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
        }
    }
}

/// One processed row of a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Profile fields, by profile field name.
    pub fields: BTreeMap<String, Value>,
    /// Developer fields, by developer field name, holding unprocessed values.
    pub developer: BTreeMap<String, Value>,
    /// Units of the fields present in this row, where known.
    pub units: BTreeMap<String, String>,
}

impl Row {
    /// A profile field, or failing that, a developer field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).or_else(|| self.developer.get(name))
    }
}

/// All rows of one global message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub global: u16,
    /// Name of the message, if the dictionary knows it.
    pub name: Option<String>,
    /// Rows in document order. Empty for messages unknown to the dictionary.
    pub rows: Vec<Row>,
}

/// The assembled contents of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Messages in order of their first definition.
    pub messages: Vec<Message>,
    /// Everything left out while decoding and assembling.
    pub diagnostics: Vec<Diagnostic>,
}

impl Activity {
    /// The first message with a name.
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name.as_deref() == Some(name))
    }
}

/// Turns decoded definitions into messages, using a shared dictionary.
pub struct Assembler<'d> {
    dictionary: &'d dyn Dictionary,
    options: DecodeOptions,
}

impl<'d> Assembler<'d> {
    pub fn new(dictionary: &'d dyn Dictionary, options: &DecodeOptions) -> Self {
        Self {
            dictionary,
            options: *options,
        }
    }

    /// Assemble the messages of a decoded document.
    ///
    /// Diagnostics from decoding are carried over ahead of those raised
    /// here.
    pub fn assemble(&self, decoded: &Decoded) -> Activity {
        let mut diagnostics = decoded.diagnostics.clone();

        // Rows of each global message, and the index of its first definition.
        let mut groups: BTreeMap<u16, (usize, Vec<&DataRecord>)> = BTreeMap::new();
        for d in &decoded.definitions {
            let (first, rows) = groups.entry(d.global).or_insert((d.index, Vec::new()));
            *first = d.index.min(*first);
            rows.extend(&d.rows);
        }

        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort_by_key(|(_, (first, _))| *first);

        let messages = groups
            .into_iter()
            .map(|(global, (_, mut rows))| {
                rows.sort_by_key(|r| r.index);
                self.message(global, &rows, &mut diagnostics)
            })
            .collect();

        Activity {
            messages,
            diagnostics,
        }
    }

    fn message(
        &self,
        global: u16,
        rows: &[&DataRecord],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Message {
        let name = self.dictionary.message_name(global).map(String::from);
        let fields = self.dictionary.fields(global).filter(|_| name.is_some());

        let Some(fields) = fields else {
            report(diagnostics, Diagnostic::UnknownMessage { global });

            return Message {
                global,
                name,
                rows: Vec::new(),
            };
        };

        debug!(global, ?name, rows = rows.len(), "assembling message");

        let mut unknown = BTreeMap::new();
        let rows = rows
            .iter()
            .map(|r| self.row(global, r, fields, &mut unknown, diagnostics))
            .collect();

        for (field, rows) in unknown {
            report(diagnostics, Diagnostic::UnknownField { global, field, rows });
        }

        Message { global, name, rows }
    }

    fn row(
        &self,
        global: u16,
        record: &DataRecord,
        fields: &FieldTable,
        unknown: &mut BTreeMap<u8, usize>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Row {
        let mut row = Row::default();

        for (key, field) in &record.fields {
            match key {
                FieldKey::Fixed(number) => {
                    if !field.valid {
                        continue;
                    }

                    let Some(info) = fields.get(number) else {
                        *unknown.entry(*number).or_default() += 1;
                        continue;
                    };

                    let value =
                        transform::transform(info, &field.value, self.dictionary, &self.options);

                    match value {
                        Ok(value) => {
                            if let Some(units) = &info.units {
                                row.units.insert(info.name.clone(), units.clone());
                            }
                            row.fields.insert(info.name.clone(), value);
                        }
                        Err(error) => report(
                            diagnostics,
                            Diagnostic::FieldTransform {
                                global,
                                field: info.name.clone(),
                                error,
                            },
                        ),
                    }
                }
                FieldKey::Developer(name) => {
                    if let Some(units) = &field.units {
                        row.units.insert(name.clone(), units.clone());
                    }
                    row.developer.insert(name.clone(), Value::from(&field.value));
                }
            }
        }

        special::post_process(global, &mut row, self.dictionary, diagnostics);

        row
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!(%diagnostic, "dropped from output");
    diagnostics.push(diagnostic);
}
