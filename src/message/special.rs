//! Message-specific processing, run after the generic transforms.

use alloc::{string::String, vec::Vec};

use crate::{diagnostic::Diagnostic, profile::Dictionary};

use super::{Row, TransformError, Value, report};

pub const FILE_ID: u16 = 0;
pub const EVENT: u16 = 21;
pub const DEVICE_INFO: u16 = 23;

/// Enumeration of ANT+ device types.
pub const ANTPLUS_DEVICE_TYPE: &str = "enum_antplus_device_type";
/// Enumeration of product codes shared by Garmin and Dynastream devices.
pub const GARMIN_PRODUCT: &str = "enum_garmin_product";

/// Apply the processing specific to a global message, if any.
pub fn post_process(
    global: u16,
    row: &mut Row,
    dictionary: &dyn Dictionary,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match global {
        EVENT => gear_change(row, diagnostics),
        FILE_ID | DEVICE_INFO => device_info(row, dictionary),
        _ => {}
    }
}

/// Split the data of a gear change event into its four byte-sized parts.
///
/// Array data is split from its first element. Data that is not a 32-bit
/// integer is left in place and reported.
fn gear_change(row: &mut Row, diagnostics: &mut Vec<Diagnostic>) {
    let is_gear_change = matches!(
        row.fields.get("event"),
        Some(Value::Enum(e)) if e == "rear_gear_change" || e == "front_gear_change"
    );

    if !is_gear_change {
        return;
    }

    let data = match row.fields.get("data") {
        None => return,
        Some(Value::Array(items)) => items.first(),
        Some(value) => Some(value),
    };

    let data = data
        .and_then(Value::as_u64)
        .ok_or(TransformError::NotNumeric)
        .and_then(|d| u32::try_from(d).map_err(|_| TransformError::OutOfRange));

    let data = match data {
        Ok(data) => data,
        Err(error) => {
            let field = "data".into();
            report(diagnostics, Diagnostic::FieldTransform { global: EVENT, field, error });
            return;
        }
    };

    row.fields.remove("data");

    let names = ["rear_gear_num", "rear_gear", "front_gear_num", "front_gear"];
    for (name, byte) in names.into_iter().zip(data.to_le_bytes()) {
        row.fields.insert(name.into(), Value::Unsigned(byte as u64));
    }
}

/// Resolve the device type and product fields, whose enumeration depends on
/// the source and manufacturer of the device.
fn device_info(row: &mut Row, dictionary: &dyn Dictionary) {
    if is_enum(row, "source_type", &["antplus"]) {
        if let Some(label) = relabel(row, "device_type", ANTPLUS_DEVICE_TYPE, dictionary) {
            row.fields.insert("device_type".into(), Value::Enum(label));
        }
    }

    if is_enum(row, "manufacturer", &["garmin", "dynastream", "dynastream_oem"]) {
        let label = relabel(row, "garmin_product", GARMIN_PRODUCT, dictionary)
            .or_else(|| relabel(row, "product", GARMIN_PRODUCT, dictionary));

        if let Some(label) = label {
            row.fields.insert("garmin_product".into(), Value::Enum(label));
        }
    }
}

fn is_enum(row: &Row, field: &str, labels: &[&str]) -> bool {
    matches!(row.fields.get(field), Some(Value::Enum(e)) if labels.contains(&e.as_str()))
}

fn relabel(
    row: &Row,
    field: &str,
    enumeration: &str,
    dictionary: &dyn Dictionary,
) -> Option<String> {
    let n = row.fields.get(field)?.as_u64()?;
    dictionary.enum_values(enumeration)?.get(&n).cloned()
}
