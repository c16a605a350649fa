mod common;

use common::{Document, profile};
use spoke::{
    Assembler, DecodeOptions, Diagnostic, Error, Value,
    sans::{
        base_type::RawValue,
        data::FieldKey,
        header::DocumentHeaderError,
    },
};

const UINT8: u8 = 0x02;
const UINT16: u8 = 0x84;
const UINT32: u8 = 0x86;
const STRING: u8 = 0x07;

#[test]
fn decode_invalid_then_valid_row() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .data(0, &[0xFF])
        .data(0, &[0x05])
        .build();

    let options = DecodeOptions::default();
    let decoded = spoke::avec::decode_slice(&data, &options).unwrap();

    assert_eq!(decoded.definitions.len(), 1);
    assert_eq!(decoded.row_count(), 2);
    assert!(decoded.diagnostics.is_empty());

    let rows = &decoded.definitions[0].rows;
    assert!(!rows[0].fields[&FieldKey::Fixed(3)].valid);
    assert_eq!(rows[1].fields[&FieldKey::Fixed(3)].value, RawValue::U8(5));

    let profile = profile();
    let activity = Assembler::new(&profile, &options).assemble(&decoded);

    assert_eq!(activity.messages.len(), 1);
    let record = &activity.messages[0];
    assert_eq!(record.global, 20);
    assert_eq!(record.name.as_deref(), Some("record"));
    assert_eq!(record.rows.len(), 2);
    assert_eq!(record.rows[0].get("heart_rate"), None);
    assert_eq!(record.rows[1].get("heart_rate"), Some(&Value::Unsigned(5)));
}

#[test]
fn decode_two_byte_field_with_scale() {
    let data = Document::new()
        .definition(0, 20, false, &[(6, 2, UINT16)])
        .data(0, &[0xFF, 0xFF])
        .data(0, &[0x05, 0x00])
        .build();

    let options = DecodeOptions::default();
    let decoded = spoke::avec::decode_slice(&data, &options).unwrap();
    let profile = profile();
    let activity = Assembler::new(&profile, &options).assemble(&decoded);

    let rows = &activity.messages[0].rows;
    assert!(rows[0].fields.is_empty());
    assert_eq!(rows[1].get("speed"), Some(&Value::Float(0.005)));
}

#[test]
fn redefinition_flushes_pending_rows_once() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .data(0, &[60])
        .data(0, &[61])
        .definition(0, 21, false, &[(0, 1, 0x00), (3, 4, UINT32)])
        .data(0, &[0, 1, 0, 0, 0])
        .build();

    let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap();

    assert_eq!(decoded.definitions.len(), 2);

    let first = &decoded.definitions[0];
    assert_eq!(first.global, 20);
    assert_eq!(first.rows.len(), 2);
    assert!(first.rows.iter().all(|r| r.global == 20));

    let second = &decoded.definitions[1];
    assert_eq!(second.global, 21);
    assert_eq!(second.rows.len(), 1);
    assert_eq!(
        second.rows[0].fields[&FieldKey::Fixed(3)].value,
        RawValue::U32(1)
    );
}

#[test]
fn slots_sharing_a_global_message_merge_in_document_order() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .definition(1, 20, false, &[(3, 1, UINT8), (13, 1, 0x01)])
        .data(0, &[1])
        .data(1, &[2, 20])
        .data(0, &[3])
        .build();

    let options = DecodeOptions::default();
    let decoded = spoke::avec::decode_slice(&data, &options).unwrap();
    let profile = profile();
    let activity = Assembler::new(&profile, &options).assemble(&decoded);

    assert_eq!(activity.messages.len(), 1);

    let rows = &activity.messages[0].rows;
    let heart_rates: Vec<_> = rows.iter().map(|r| r.get("heart_rate").cloned()).collect();
    assert_eq!(
        heart_rates,
        vec![
            Some(Value::Unsigned(1)),
            Some(Value::Unsigned(2)),
            Some(Value::Unsigned(3))
        ]
    );
    assert_eq!(rows[1].get("temperature"), Some(&Value::Signed(20)));
}

#[test]
fn big_endian_definitions() {
    let data = Document::new()
        .definition(2, 20, true, &[(6, 2, UINT16)])
        .data(2, &[0x03, 0xE8])
        .build();

    let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap();

    let definition = &decoded.definitions[0];
    assert_eq!(definition.global, 20);
    assert_eq!(
        definition.rows[0].fields[&FieldKey::Fixed(6)].value,
        RawValue::U16(1000)
    );
}

#[test]
fn unbound_slot_halts_decoding() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .data(0, &[1])
        .data(7, &[1])
        .data(0, &[2])
        .build();

    let err = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap_err();

    // After the file header, a definition and one data record.
    assert!(matches!(err, Error::UnboundSlot { local: 7, offset: 25 }));
}

#[test]
fn malformed_header_halts_decoding() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .raw(&[0x10])
        .build();

    let err = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedHeader { offset: 23, header: 0x10 }));
}

#[test]
fn truncated_record_exhausts_the_stream() {
    let mut data = Document::new()
        .definition(0, 20, false, &[(6, 2, UINT16)])
        .data(0, &[1, 0])
        .build();

    // Drop the check value and the last byte of the data record.
    data.truncate(data.len() - 3);

    let err = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::StreamExhausted { needed: 1, .. }));
}

#[test]
fn records_stay_within_the_declared_size() {
    let mut data = Document::new()
        .definition(0, 20, false, &[(6, 2, UINT16)])
        .data(0, &[5, 0])
        .build();

    // Declare one byte less than the records take, so the last value would
    // read into the check value.
    let declared = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) - 1;
    data[4..8].copy_from_slice(&declared.to_le_bytes());

    let err = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::StreamExhausted {
            offset: 24,
            needed: 1
        }
    ));

    let err = spoke::avec::decode_reader(&mut data.as_slice(), &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::StreamExhausted {
            offset: 24,
            needed: 1
        }
    ));
}

#[test]
fn slices_decode_documents_with_bytes_to_spare() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .data(0, &[5])
        .build();

    let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.row_count(), 1);
    assert_eq!(
        decoded.definitions[0].rows[0].fields[&FieldKey::Fixed(3)].value,
        RawValue::U8(5)
    );
}

#[test]
fn not_fit_data() {
    let mut data = Document::new().build();
    data[9] = b'X';

    let err = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Header(DocumentHeaderError::NotFitData)));
}

#[test]
fn unknown_messages_keep_decoding() {
    let data = Document::new()
        .definition(0, 4242, false, &[(0, 1, UINT8)])
        .data(0, &[9])
        .definition(1, 20, false, &[(3, 1, UINT8)])
        .data(1, &[70])
        .build();

    let options = DecodeOptions::default();
    let decoded = spoke::avec::decode_slice(&data, &options).unwrap();
    let profile = profile();
    let activity = Assembler::new(&profile, &options).assemble(&decoded);

    assert_eq!(activity.messages.len(), 2);

    let unknown = &activity.messages[0];
    assert_eq!(unknown.global, 4242);
    assert_eq!(unknown.name, None);
    assert!(unknown.rows.is_empty());

    let record = &activity.messages[1];
    assert_eq!(record.rows[0].get("heart_rate"), Some(&Value::Unsigned(70)));

    assert_eq!(
        activity.diagnostics,
        vec![Diagnostic::UnknownMessage { global: 4242 }]
    );
}

#[test]
fn unknown_fields_are_reported_once() {
    let data = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8), (99, 1, UINT8)])
        .data(0, &[1, 1])
        .data(0, &[2, 2])
        .build();

    let options = DecodeOptions::default();
    let decoded = spoke::avec::decode_slice(&data, &options).unwrap();
    let profile = profile();
    let activity = Assembler::new(&profile, &options).assemble(&decoded);

    assert_eq!(activity.messages[0].rows.len(), 2);
    assert_eq!(
        activity.diagnostics,
        vec![Diagnostic::UnknownField {
            global: 20,
            field: 99,
            rows: 2
        }]
    );
}

#[test]
fn crc_verification() {
    let document = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .data(0, &[1])
        .build();

    let options = DecodeOptions::default().verify_crc(true);
    spoke::avec::decode_slice(&document, &options).unwrap();

    let short = Document::new()
        .definition(0, 20, false, &[(3, 1, UINT8)])
        .data(0, &[1])
        .build_short();
    spoke::avec::decode_slice(&short, &options).unwrap();

    let mut corrupt = document.clone();
    let last = corrupt.len() - 3;
    corrupt[last] ^= 0x01;

    // Unverified decoding does not notice.
    spoke::avec::decode_slice(&corrupt, &DecodeOptions::default()).unwrap();

    let err = spoke::avec::decode_slice(&corrupt, &options).unwrap_err();
    assert!(matches!(err, Error::CyclicRedundancyCheck { .. }));

    let mut corrupt_header = document.clone();
    corrupt_header[1] ^= 0x01;
    let err = spoke::avec::decode_slice(&corrupt_header, &options).unwrap_err();
    assert!(matches!(err, Error::CyclicRedundancyCheck { .. }));
}

#[test]
fn compressed_timestamp_headers_carry_their_offset() {
    let data = Document::new()
        .definition(1, 20, false, &[(3, 1, UINT8)])
        .compressed(1, 17, &[80])
        .build();

    let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap();

    let row = &decoded.definitions[0].rows[0];
    assert_eq!(row.time_offset, Some(17));
    assert_eq!(row.fields[&FieldKey::Fixed(3)].value, RawValue::U8(80));
}

/// A field description for developer 0, field 1: a `uint16` named `power2`.
fn describe_power(document: &mut Document) {
    let mut description = vec![0, 1, UINT16];
    description.extend(b"power2\0\0");
    description.extend(b"W\0\0\0");

    document
        .definition(
            3,
            206,
            false,
            &[(0, 1, UINT8), (1, 1, UINT8), (2, 1, UINT8), (3, 8, STRING), (8, 4, STRING)],
        )
        .data(3, &description);
}

#[test]
fn developer_fields_resolve_by_name() {
    let mut document = Document::new();
    describe_power(&mut document);
    document
        .developer_definition(0, 20, &[(3, 1, UINT8)], &[(1, 2, 0)])
        .data(0, &[90, 0x2C, 0x01]);

    let data = document.build();
    let options = DecodeOptions::default();
    let decoded = spoke::avec::decode_slice(&data, &options).unwrap();
    assert!(decoded.diagnostics.is_empty());

    let record = decoded.definitions.iter().find(|d| d.global == 20).unwrap();
    assert_eq!(
        record.rows[0].fields[&FieldKey::Developer("power2".into())].value,
        RawValue::U16(300)
    );

    let profile = profile();
    let activity = Assembler::new(&profile, &options).assemble(&decoded);
    let row = &activity.message("record").unwrap().rows[0];

    assert_eq!(row.developer.get("power2"), Some(&Value::Unsigned(300)));
    assert_eq!(row.units.get("power2").map(String::as_str), Some("W"));
    assert_eq!(row.units.get("heart_rate").map(String::as_str), Some("bpm"));
    assert_eq!(row.get("heart_rate"), Some(&Value::Unsigned(90)));

    let descriptions = activity.message("field_description").unwrap();
    assert_eq!(
        descriptions.rows[0].get("field_name"),
        Some(&Value::Text("power2".into()))
    );
    assert_eq!(descriptions.rows[0].get("units"), Some(&Value::Text("W".into())));
}

#[test]
fn unresolved_developer_fields_are_skipped() {
    let data = Document::new()
        .developer_definition(0, 20, &[(3, 1, UINT8)], &[(5, 2, 0)])
        .data(0, &[90, 0x2C, 0x01])
        .data(0, &[91, 0x2C, 0x01])
        .build();

    let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap();

    let rows = &decoded.definitions[0].rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].fields.len(), 1);
    assert_eq!(rows[1].fields[&FieldKey::Fixed(3)].value, RawValue::U8(91));

    assert_eq!(
        decoded.diagnostics[0],
        Diagnostic::FieldResolution {
            offset: 14 + 13 + 2,
            developer_index: 0,
            number: 5
        }
    );
    assert_eq!(decoded.diagnostics.len(), 2);
}

#[test]
fn incomplete_field_descriptions_are_reported() {
    let data = Document::new()
        .definition(0, 206, false, &[(0, 1, UINT8), (1, 1, UINT8)])
        .data(0, &[0, 1])
        .build();

    let decoded = spoke::avec::decode_slice(&data, &DecodeOptions::default()).unwrap();
    assert_eq!(
        decoded.diagnostics,
        vec![Diagnostic::InvalidDescription { record: 1 }]
    );
}

#[test]
fn reader_and_slice_agree() {
    let mut document = Document::new();
    describe_power(&mut document);
    document
        .developer_definition(0, 20, &[(3, 1, UINT8)], &[(1, 2, 0)])
        .data(0, &[90, 0x2C, 0x01])
        .definition(0, 21, true, &[(3, 4, UINT32)])
        .compressed(0, 3, &[0, 0, 0, 7]);

    let data = document.build();
    let options = DecodeOptions::default().verify_crc(true);

    let from_slice = spoke::avec::decode_slice(&data, &options).unwrap();
    let from_reader = spoke::avec::decode_reader(&mut data.as_slice(), &options).unwrap();

    assert_eq!(from_slice, from_reader);
}

#[test]
fn reader_reports_exhaustion() {
    let mut data = Document::new()
        .definition(0, 20, false, &[(6, 2, UINT16)])
        .data(0, &[1, 0])
        .build();
    data.truncate(data.len() - 3);

    let err = spoke::avec::decode_reader(&mut data.as_slice(), &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::StreamExhausted { needed: 1, .. }));
}
