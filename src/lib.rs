#![no_std]

//! A decoder for Garmin's Flexible and Interoperable Data Transfer protocol,
//! producing typed, named messages.
//!
//! Decoding happens in two stages. First, the record stream is read into
//! definition records and the raw data rows decoded under each of them (see
//! [`avec::decode_slice`] and [`avec::decode_reader`]). Then, an
//! [`message::Assembler`] groups those rows by global message number and
//! applies the semantic metadata of a [`profile::Dictionary`]: enumeration
//! names, timestamps, coordinates, scales and offsets.
//!
//! The building blocks of the first stage (byte reader, base type catalog,
//! record header and definition decoders) are exposed in the [`sans`] module
//! for applications that need finer control.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable reader-based decoding (default).

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod avec;
pub mod diagnostic;
pub mod message;
pub mod profile;
pub mod sans;

pub use avec::{DecodeOptions, Decoded};
pub use diagnostic::Diagnostic;
pub use message::{Activity, Assembler, Message, Row, Value};
pub use profile::{Dictionary, Profile};
pub use sans::Error;
