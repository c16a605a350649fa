//! The catalog of protocol base types.

use alloc::{string::String, vec::Vec};

use super::cursor::Endian;

/// How the bytes of a base type are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Unsigned,
    Signed,
    Float,
    Text,
    /// An unsigned byte holding an enumeration value.
    Enum,
    /// Opaque bytes.
    Byte,
}

macro_rules! base_types {
    ($($(#[$attr:meta])* $name:ident = $byte:literal, $width:literal, $encoding:ident, $invalid:expr;)*) => {
        /// A protocol base type, identified by the base type byte of a field
        /// definition (including its endian-capability flag).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum BaseType {
            $($(#[$attr])* $name,)*
        }

        impl BaseType {
            /// Every base type in the catalog.
            pub const ALL: &[BaseType] = &[$(Self::$name,)*];

            /// Look up a base type byte, if it belongs to the catalog.
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$name),)*
                    _ => None,
                }
            }

            /// The base type byte identifying this type.
            pub fn byte(self) -> u8 {
                match self {
                    $(Self::$name => $byte,)*
                }
            }

            /// Width of a single element in bytes.
            pub fn width(self) -> usize {
                match self {
                    $(Self::$name => $width,)*
                }
            }

            pub fn encoding(self) -> Encoding {
                match self {
                    $(Self::$name => Encoding::$encoding,)*
                }
            }

            /// The reserved bit pattern meaning 'no value', zero-extended.
            pub fn invalid(self) -> u64 {
                match self {
                    $(Self::$name => $invalid,)*
                }
            }
        }
    };
}

base_types! {
    /// `enum`
    Enum = 0x00, 1, Enum, 0xFF;
    /// `sint8`
    SInt8 = 0x01, 1, Signed, 0x7F;
    /// `uint8`
    UInt8 = 0x02, 1, Unsigned, 0xFF;
    /// `sint16`
    SInt16 = 0x83, 2, Signed, 0x7FFF;
    /// `uint16`
    UInt16 = 0x84, 2, Unsigned, 0xFFFF;
    /// `sint32`
    SInt32 = 0x85, 4, Signed, 0x7FFF_FFFF;
    /// `uint32`
    UInt32 = 0x86, 4, Unsigned, 0xFFFF_FFFF;
    /// `string`
    String = 0x07, 1, Text, 0x00;
    /// `float32`
    Float32 = 0x88, 4, Float, 0xFFFF_FFFF;
    /// `float64`
    Float64 = 0x89, 8, Float, u64::MAX;
    /// `uint8z`
    UInt8z = 0x0A, 1, Unsigned, 0x00;
    /// `uint16z`
    UInt16z = 0x8B, 2, Unsigned, 0x0000;
    /// `uint32z`
    UInt32z = 0x8C, 4, Unsigned, 0x0000_0000;
    /// `byte`
    Byte = 0x0D, 1, Byte, 0xFF;
    /// `sint64`
    SInt64 = 0x8E, 8, Signed, 0x7FFF_FFFF_FFFF_FFFF;
    /// `uint64`
    UInt64 = 0x8F, 8, Unsigned, u64::MAX;
    /// `uint64z`
    UInt64z = 0x90, 8, Unsigned, 0;
}

impl BaseType {
    /// Whether multi-byte elements depend on the definition's architecture.
    pub fn needs_endian(self) -> bool {
        self.width() > 1
    }

    /// Decode a single element of this type.
    ///
    /// `r` must be exactly [`BaseType::width`] bytes long. Text is handled by
    /// the caller, as it spans the whole field rather than one element.
    pub fn decode(self, r: &[u8], endian: Endian) -> RawValue {
        macro_rules! primitive {
            ($t:ty, $variant:ident) => {{
                let mut buf = [0; size_of::<$t>()];
                buf.copy_from_slice(r);

                RawValue::$variant(match endian {
                    Endian::Little => <$t>::from_le_bytes(buf),
                    Endian::Big => <$t>::from_be_bytes(buf),
                })
            }};
        }

        match self {
            Self::Enum | Self::UInt8 | Self::UInt8z | Self::Byte | Self::String => {
                RawValue::U8(r[0])
            }
            Self::SInt8 => RawValue::I8(r[0] as i8),
            Self::SInt16 => primitive!(i16, I16),
            Self::UInt16 | Self::UInt16z => primitive!(u16, U16),
            Self::SInt32 => primitive!(i32, I32),
            Self::UInt32 | Self::UInt32z => primitive!(u32, U32),
            Self::Float32 => primitive!(f32, F32),
            Self::Float64 => primitive!(f64, F64),
            Self::SInt64 => primitive!(i64, I64),
            Self::UInt64 | Self::UInt64z => primitive!(u64, U64),
        }
    }

    /// Whether a decoded value holds the 'invalid' marker of this type.
    ///
    /// An array is invalid only if every element is; text is invalid when
    /// empty.
    pub fn is_invalid(self, value: &RawValue) -> bool {
        match value {
            RawValue::Text(s) => s.is_empty(),
            RawValue::Array(items) => items.iter().all(|v| self.is_invalid(v)),
            scalar => scalar.bits() == Some(self.invalid()),
        }
    }
}

/// A field value as stored in the document, before any semantic processing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Text(String),
    /// Elements of a single base type, in document order.
    Array(Vec<RawValue>),
}

impl RawValue {
    /// The bit pattern of a scalar, zero-extended from its own width.
    pub fn bits(&self) -> Option<u64> {
        let bits = match *self {
            Self::U8(x) => x as u64,
            Self::I8(x) => x as u8 as u64,
            Self::U16(x) => x as u64,
            Self::I16(x) => x as u16 as u64,
            Self::U32(x) => x as u64,
            Self::I32(x) => x as u32 as u64,
            Self::U64(x) => x,
            Self::I64(x) => x as u64,
            Self::F32(x) => x.to_bits() as u64,
            Self::F64(x) => x.to_bits(),
            Self::Text(_) | Self::Array(_) => return None,
        };

        Some(bits)
    }

    /// The value of an unsigned integer scalar.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(x) => Some(x as u64),
            Self::U16(x) => Some(x as u64),
            Self::U32(x) => Some(x as u64),
            Self::U64(x) => Some(x),
            _ => None,
        }
    }

    /// The value of any integer scalar, widened.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::I8(x) => Some(x as i128),
            Self::I16(x) => Some(x as i128),
            Self::I32(x) => Some(x as i128),
            Self::I64(x) => Some(x as i128),
            _ => self.as_u64().map(|x| x as i128),
        }
    }
}
