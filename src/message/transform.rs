//! Conversion of raw field values into semantic values.

use alloc::{string::String, vec::Vec};

use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::{
    avec::DecodeOptions,
    profile::{Dictionary, FieldInfo, FieldKind},
    sans::base_type::RawValue,
};

use super::Value;

/// Seconds from the Unix epoch to 1989-12-31T00:00:00 UTC.
pub const FIT_EPOCH: i64 = 631_065_600;

/// Degrees per semicircle.
pub const SEMICIRCLE: f64 = 180.0 / 2_147_483_648.0;

/// A failure processing a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The dictionary does not list the field's enumeration.
    #[error("unknown enumeration `{0}`")]
    MissingEnum(String),
    /// A numeric conversion met a value that is not a number.
    #[error("expected a number")]
    NotNumeric,
    /// A conversion left the representable range.
    #[error("value out of range")]
    OutOfRange,
}

/// Apply enumeration, time, coordinate, scale and offset conversions to a
/// raw value, in that order. Arrays are converted element by element.
pub fn transform(
    info: &FieldInfo,
    raw: &RawValue,
    dictionary: &dyn Dictionary,
    options: &DecodeOptions,
) -> Result<Value, TransformError> {
    match raw {
        RawValue::Array(items) => items
            .iter()
            .map(|item| transform(info, item, dictionary, options))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => {
            let value = interpret(&info.kind, raw, dictionary, options)?;
            let value = scale(value, info.scale)?;

            if options.apply_offset {
                offset(value, info.offset)
            } else {
                Ok(value)
            }
        }
    }
}

fn interpret(
    kind: &FieldKind,
    raw: &RawValue,
    dictionary: &dyn Dictionary,
    options: &DecodeOptions,
) -> Result<Value, TransformError> {
    Ok(match kind {
        FieldKind::Plain => Value::from(raw),
        FieldKind::Enum(name) => {
            let table = dictionary
                .enum_values(name)
                .ok_or_else(|| TransformError::MissingEnum(name.clone()))?;
            let n = raw.as_u64().ok_or(TransformError::NotNumeric)?;

            // Values missing from the table stay numeric.
            match table.get(&n) {
                Some(label) => Value::Enum(label.clone()),
                None => Value::Unsigned(n),
            }
        }
        FieldKind::DateTime => Value::DateTime(date_time(raw)?),
        FieldKind::LocalDateTime => {
            let naive = date_time(raw)?.naive_utc();
            let local = options
                .local_offset
                .from_local_datetime(&naive)
                .single()
                .ok_or(TransformError::OutOfRange)?;

            Value::LocalDateTime(local)
        }
        FieldKind::Coordinates => {
            let n = raw.as_i128().ok_or(TransformError::NotNumeric)?;
            Value::Float(n as f64 * SEMICIRCLE)
        }
    })
}

fn date_time(raw: &RawValue) -> Result<DateTime<chrono::Utc>, TransformError> {
    let seconds = raw.as_u64().ok_or(TransformError::NotNumeric)?;
    let seconds = i64::try_from(seconds)
        .ok()
        .and_then(|s| s.checked_add(FIT_EPOCH))
        .ok_or(TransformError::OutOfRange)?;

    DateTime::from_timestamp(seconds, 0).ok_or(TransformError::OutOfRange)
}

fn scale(value: Value, scale: f64) -> Result<Value, TransformError> {
    if scale == 0.0 || scale == 1.0 {
        return Ok(value);
    }

    finite(value.as_f64().ok_or(TransformError::NotNumeric)? / scale)
}

fn offset(value: Value, offset: f64) -> Result<Value, TransformError> {
    if offset == 0.0 {
        return Ok(value);
    }

    finite(value.as_f64().ok_or(TransformError::NotNumeric)? - offset)
}

fn finite(x: f64) -> Result<Value, TransformError> {
    if x.is_finite() {
        Ok(Value::Float(x))
    } else {
        Err(TransformError::OutOfRange)
    }
}
