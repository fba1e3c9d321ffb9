//! Borrowed text stored as code units.

use std::fmt;
use std::marker::PhantomData;
use std::str::Utf8Error;

use super::element::CharUnit;

/// Read-only view of text code units, terminator excluded.
///
/// Units are decoded on access since linear memory gives no alignment
/// guarantee for `u16`/`u32`. For UTF-8 the bytes are the text itself.
#[derive(Clone, Copy)]
pub struct TextView<'a, C> {
    bytes: &'a [u8],
    _marker: PhantomData<C>,
}

impl<'a, C: CharUnit> TextView<'a, C> {
    /// `bytes.len()` must be a multiple of `C::SIZE`.
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        debug_assert!(bytes.len().is_multiple_of(C::SIZE));
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    /// Number of code units.
    pub fn len(&self) -> usize {
        self.bytes.len() / C::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Code unit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<C> {
        if index >= self.len() {
            return None;
        }
        Some(C::read_le(&self.bytes[index * C::SIZE..]))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = C> + DoubleEndedIterator + use<'a, C> {
        self.bytes.chunks_exact(C::SIZE).map(C::read_le)
    }

    /// Encoded bytes of the text.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Owned copy of the code units.
    pub fn to_vec(&self) -> Vec<C> {
        self.iter().collect()
    }

    pub fn to_string_lossy(&self) -> String {
        C::decode_lossy(&self.to_vec())
    }
}

impl<'a> TextView<'a, u8> {
    /// The text as `&str` without copying.
    pub fn as_str(&self) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.bytes)
    }
}

impl<C> PartialEq for TextView<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<C> Eq for TextView<'_, C> {}

#[cfg_attr(coverage_nightly, coverage(off))]
impl<C: CharUnit> fmt::Debug for TextView<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}
