//! Shared types: [`ByteOrder`], [`SampleEncoding`], and [`Platform`].

use std::fmt;
use std::str::FromStr;

use crate::{Result, SudsError};

/// Byte order for multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// Byte order of the machine this code runs on.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// Native sample encoding of a trace packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    /// 16-bit signed integer (`s2` / `i2`).
    Int16,
    /// 32-bit signed integer (`s4` / `i4`).
    Int32,
    /// 32-bit IEEE float (`t4` / `f4`).
    Float32,
}

impl SampleEncoding {
    /// Parse an Earthworm datatype tag into an encoding and its wire byte order.
    ///
    /// The first character selects the byte order (`s`/`t` big-endian,
    /// `i`/`f` little-endian), the second the sample width.
    pub fn from_datatype(tag: &str) -> Result<(Self, ByteOrder)> {
        let unsupported = || SudsError::UnsupportedEncoding(tag.to_string());
        let mut chars = tag.chars();
        let (kind, width) = match (chars.next(), chars.next(), chars.next()) {
            (Some(k), Some(w), None) => (k, w),
            _ => return Err(unsupported()),
        };
        match (kind, width) {
            ('s', '2') => Ok((Self::Int16, ByteOrder::Big)),
            ('i', '2') => Ok((Self::Int16, ByteOrder::Little)),
            ('s', '4') => Ok((Self::Int32, ByteOrder::Big)),
            ('i', '4') => Ok((Self::Int32, ByteOrder::Little)),
            ('t', '4') => Ok((Self::Float32, ByteOrder::Big)),
            ('f', '4') => Ok((Self::Float32, ByteOrder::Little)),
            _ => Err(unsupported()),
        }
    }

    /// The Earthworm datatype tag for this encoding in the given byte order.
    pub fn datatype(self, byte_order: ByteOrder) -> &'static str {
        match (self, byte_order) {
            (Self::Int16, ByteOrder::Big) => "s2",
            (Self::Int16, ByteOrder::Little) => "i2",
            (Self::Int32, ByteOrder::Big) => "s4",
            (Self::Int32, ByteOrder::Little) => "i4",
            (Self::Float32, ByteOrder::Big) => "t4",
            (Self::Float32, ByteOrder::Little) => "f4",
        }
    }

    /// Size of one sample in bytes.
    pub fn sample_size(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 | Self::Float32 => 4,
        }
    }
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int16 => write!(f, "INT16"),
            Self::Int32 => write!(f, "INT32"),
            Self::Float32 => write!(f, "FLOAT32"),
        }
    }
}

/// A platform whose native byte order a SUDS file is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Little-endian PC (`"intel"`, machine code `'6'`).
    Intel,
    /// Big-endian Sun workstation (`"sparc"`, machine code `'1'`).
    Sparc,
}

impl Platform {
    /// The platform matching the byte order of the running machine.
    pub fn native() -> Self {
        Self::from_byte_order(ByteOrder::native())
    }

    pub fn from_byte_order(order: ByteOrder) -> Self {
        match order {
            ByteOrder::Little => Self::Intel,
            ByteOrder::Big => Self::Sparc,
        }
    }

    pub fn byte_order(self) -> ByteOrder {
        match self {
            Self::Intel => ByteOrder::Little,
            Self::Sparc => ByteOrder::Big,
        }
    }

    /// Machine code stored in the SUDS structure tag.
    pub fn machine_code(self) -> u8 {
        match self {
            Self::Intel => b'6',
            Self::Sparc => b'1',
        }
    }

    /// Inverse of [`Platform::machine_code`].
    pub fn from_machine_code(code: u8) -> Result<Self> {
        match code {
            b'6' => Ok(Self::Intel),
            b'1' => Ok(Self::Sparc),
            other => Err(SudsError::UnrecognizedPlatform(
                char::from(other).to_string(),
            )),
        }
    }
}

impl FromStr for Platform {
    type Err = SudsError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("intel") {
            Ok(Self::Intel)
        } else if s.eq_ignore_ascii_case("sparc") {
            Ok(Self::Sparc)
        } else {
            Err(SudsError::UnrecognizedPlatform(s.to_string()))
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intel => write!(f, "intel"),
            Self::Sparc => write!(f, "sparc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_parsing() {
        assert_eq!(
            SampleEncoding::from_datatype("s2").unwrap(),
            (SampleEncoding::Int16, ByteOrder::Big)
        );
        assert_eq!(
            SampleEncoding::from_datatype("i4").unwrap(),
            (SampleEncoding::Int32, ByteOrder::Little)
        );
        assert_eq!(
            SampleEncoding::from_datatype("t4").unwrap(),
            (SampleEncoding::Float32, ByteOrder::Big)
        );
        for tag in ["f8", "t8", "s3", "x4", "", "i", "i44"] {
            assert!(
                matches!(
                    SampleEncoding::from_datatype(tag),
                    Err(SudsError::UnsupportedEncoding(_))
                ),
                "{tag} should be rejected"
            );
        }
    }

    #[test]
    fn test_datatype_tag_inverse() {
        for enc in [
            SampleEncoding::Int16,
            SampleEncoding::Int32,
            SampleEncoding::Float32,
        ] {
            for order in [ByteOrder::Big, ByteOrder::Little] {
                let tag = enc.datatype(order);
                assert_eq!(SampleEncoding::from_datatype(tag).unwrap(), (enc, order));
            }
        }
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("intel".parse::<Platform>().unwrap(), Platform::Intel);
        assert_eq!("SPARC".parse::<Platform>().unwrap(), Platform::Sparc);
        assert!(matches!(
            "vax".parse::<Platform>(),
            Err(SudsError::UnrecognizedPlatform(_))
        ));
    }

    #[test]
    fn test_machine_codes() {
        assert_eq!(Platform::Intel.machine_code(), b'6');
        assert_eq!(Platform::Sparc.machine_code(), b'1');
        assert_eq!(Platform::from_machine_code(b'1').unwrap(), Platform::Sparc);
        assert!(Platform::from_machine_code(b'x').is_err());
    }

    #[test]
    fn test_native_platform_matches_byte_order() {
        assert_eq!(Platform::native().byte_order(), ByteOrder::native());
    }
}
