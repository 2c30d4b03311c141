//! Bounds-checked big-endian byte access
//!
//! ICC stores every multi-byte number big-endian. All reads go through
//! [`ByteView`], which reports out-of-range access as
//! [`Error::BufferRange`] instead of panicking.

use crate::error::{Error, Result};

/// Read-only view over profile bytes
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    /// Wrap a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Total number of bytes in the view
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Underlying bytes
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow `len` bytes starting at `offset`
    ///
    /// The returned slice borrows the source buffer, not the view.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::BufferRange {
                offset,
                len,
                available: self.data.len(),
            })
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    pub fn u16_be(&self, offset: usize) -> Result<u16> {
        self.array(offset).map(u16::from_be_bytes)
    }

    pub fn u32_be(&self, offset: usize) -> Result<u32> {
        self.array(offset).map(u32::from_be_bytes)
    }

    pub fn i32_be(&self, offset: usize) -> Result<i32> {
        self.array(offset).map(i32::from_be_bytes)
    }

    /// Fixed-width single-byte text, one `char` per byte, no validation
    pub fn ascii(&self, offset: usize, len: usize) -> Result<String> {
        Ok(self.slice(offset, len)?.iter().map(|&b| b as char).collect())
    }
}

impl<'a> From<&'a [u8]> for ByteView<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}
