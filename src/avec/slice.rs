//! Slice-based decoder implementation.

use crate::sans::{Error, cursor::Cursor};

use super::{DecodeOptions, Decoded, slots};

/// Decode the records of a document held in a slice.
///
/// This method is also re-exported as `spoke::avec::decode_slice`.
pub fn decode(r: &[u8], options: &DecodeOptions) -> Result<Decoded, Error> {
    slots::decode(&mut Cursor::new(r), options)
}
