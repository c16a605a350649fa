//! Semantic metadata for messages, fields and enumerations.
//!
//! The decoder only needs to look metadata up; where it comes from is up to
//! the application. [`Profile`] is a simple in-memory implementation that
//! can be filled from any data source.

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
};

/// Metadata for the fields of one message, keyed by field number.
pub type FieldTable = BTreeMap<u8, FieldInfo>;

/// Names of the values of one enumeration, keyed by value.
pub type EnumTable = BTreeMap<u64, String>;

/// Read-only lookup of semantic metadata.
///
/// Lookups return `None` for unknown keys; the decoder treats absence as a
/// reason to skip semantic processing, never as a failure.
pub trait Dictionary {
    /// Metadata for the fields of a global message.
    fn fields(&self, global: u16) -> Option<&FieldTable>;

    /// Names of the values of an enumeration.
    fn enum_values(&self, name: &str) -> Option<&EnumTable>;

    /// Name of a global message.
    fn message_name(&self, global: u16) -> Option<&str>;
}

/// How a field's numeric value is to be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A number, subject only to scale and offset.
    Plain,
    /// A value of the named enumeration.
    Enum(String),
    /// Seconds since 1989-12-31T00:00:00 UTC.
    DateTime,
    /// Seconds since 1989-12-31T00:00:00 in local time.
    LocalDateTime,
    /// An angle in semicircles.
    Coordinates,
}

impl FieldKind {
    /// Interpret a profile type name.
    ///
    /// Names starting with `enum` are enumerations; other names are matched
    /// against the special types, falling back to [`FieldKind::Plain`].
    pub fn parse(name: &str) -> Self {
        match name {
            "date_time" => Self::DateTime,
            "local_date_time" => Self::LocalDateTime,
            "coordinates" => Self::Coordinates,
            _ if name.starts_with("enum") => Self::Enum(name.to_string()),
            _ => Self::Plain,
        }
    }
}

/// Metadata for one field of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub kind: FieldKind,
    /// Divisor applied to the stored value. Zero and one leave it unchanged.
    pub scale: f64,
    /// Subtracted after scaling. Zero leaves the value unchanged.
    pub offset: f64,
    pub units: Option<String>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            scale: 0.0,
            offset: 0.0,
            units: None,
        }
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

/// An in-memory [`Dictionary`].
#[derive(Debug, Clone, Default)]
pub struct Profile {
    messages: BTreeMap<u16, String>,
    fields: BTreeMap<u16, FieldTable>,
    enums: BTreeMap<String, EnumTable>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a global message.
    pub fn message(&mut self, global: u16, name: impl Into<String>) -> &mut Self {
        self.messages.insert(global, name.into());
        self.fields.entry(global).or_default();
        self
    }

    /// Describe a field of a global message.
    pub fn field(&mut self, global: u16, number: u8, info: FieldInfo) -> &mut Self {
        self.fields.entry(global).or_default().insert(number, info);
        self
    }

    /// Name a value of an enumeration.
    pub fn enumeration(
        &mut self,
        name: impl Into<String>,
        value: u64,
        label: impl Into<String>,
    ) -> &mut Self {
        self.enums
            .entry(name.into())
            .or_default()
            .insert(value, label.into());
        self
    }
}

impl Dictionary for Profile {
    fn fields(&self, global: u16) -> Option<&FieldTable> {
        self.fields.get(&global)
    }

    fn enum_values(&self, name: &str) -> Option<&EnumTable> {
        self.enums.get(name)
    }

    fn message_name(&self, global: u16) -> Option<&str> {
        self.messages.get(&global).map(String::as_str)
    }
}
