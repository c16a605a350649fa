//! Issues recovered from while decoding.
//!
//! A decode that yields output but dropped something along the way always
//! reports at least one [`Diagnostic`] describing what was dropped.

use alloc::string::String;

use thiserror::Error;

use crate::message::TransformError;

/// A field or message omitted from otherwise successful output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    /// A developer field referenced a description not seen in the document.
    #[error(
        "Developer field {number} of developer {developer_index} at offset {offset} has no description."
    )]
    FieldResolution {
        offset: usize,
        developer_index: u8,
        number: u8,
    },
    /// A field description row lacked the data needed to register it.
    #[error("Field description in record {record} is incomplete.")]
    InvalidDescription { record: usize },
    /// The dictionary has no entry for a global message number.
    #[error("Unknown global message {global}.")]
    UnknownMessage { global: u16 },
    /// The dictionary has no entry for a field of a known message, present
    /// in `rows` rows.
    #[error("Unknown field {field} of global message {global}, dropped from {rows} rows.")]
    UnknownField { global: u16, field: u8, rows: usize },
    /// Semantic processing of a field failed.
    #[error("Could not process field {field} of global message {global}: {error}")]
    FieldTransform {
        global: u16,
        field: String,
        error: TransformError,
    },
}
