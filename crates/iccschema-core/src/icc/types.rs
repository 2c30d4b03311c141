//! ICC Profile Basic Types
//!
//! These types match the ICC.1:2022 specification encodings.

use std::fmt;

use crate::error::Result;
use crate::view::ByteView;

/// ICC tag or type signature (4-byte ASCII code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub u32);

impl Signature {
    /// Create from 4 ASCII characters
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// Read a signature at `offset`
    pub fn read(view: &ByteView<'_>, offset: usize) -> Result<Self> {
        view.u32_be(offset).map(Self)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    // Tag signatures
    pub const CHAD: Self = Self::from_bytes(*b"chad");
    pub const COPYRIGHT: Self = Self::from_bytes(*b"cprt");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const MEDIA_WHITE: Self = Self::from_bytes(*b"wtpt");
    pub const RED_COLORANT: Self = Self::from_bytes(*b"rXYZ");
    pub const RED_TRC: Self = Self::from_bytes(*b"rTRC");
    pub const VCGT: Self = Self::from_bytes(*b"vcgt");

    // Type signatures
    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const CURVE: Self = Self::from_bytes(*b"curv");
    pub const TEXT: Self = Self::from_bytes(*b"text");
    pub const TEXT_DESC: Self = Self::from_bytes(*b"desc");
    pub const MLUC: Self = Self::from_bytes(*b"mluc");
    pub const LUT8: Self = Self::from_bytes(*b"mft1");
    pub const LUT16: Self = Self::from_bytes(*b"mft2");
    pub const SF32: Self = Self::from_bytes(*b"sf32");
    pub const ZXML: Self = Self::from_bytes(*b"ZXML");
}

/// Renders one `char` per byte, so the result is always 4 characters.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// s15Fixed16Number - 16.16 fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S15Fixed16(pub i32);

impl S15Fixed16 {
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s15fixed16() {
        assert_eq!(S15Fixed16::from_be_bytes([0x00, 0x01, 0x00, 0x00]).to_f64(), 1.0);
        assert_eq!(S15Fixed16::from_be_bytes([0xFF, 0xFF, 0x00, 0x00]).to_f64(), -1.0);
        assert_eq!(S15Fixed16::from_raw(0x8000).to_f64(), 0.5);
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(Signature::DESC.to_string(), "desc");
        assert_eq!(Signature::XYZ.to_string(), "XYZ ");
        assert_eq!(Signature(0).to_string(), "\0\0\0\0");
    }

    #[test]
    fn test_signature_read() {
        let data = *b"\0\0chad";
        let view = ByteView::new(&data);
        assert_eq!(Signature::read(&view, 2).unwrap(), Signature::CHAD);
        assert!(Signature::read(&view, 3).is_err());
    }
}
