//! Pointer-indexed string array view.

use std::fmt;
use std::str::Utf8Error;

use super::{PTR_SIZE, read_u32_le};
use crate::{LayoutError, Result};

/// View of a pointer table followed by NUL-terminated strings.
///
/// The table has `len() + 1` entries. Entry `i` points to the first byte of
/// string `i`; the last entry points one past the final terminator. Strings
/// start right after the table, so the first entry also encodes the count.
#[derive(Clone, Copy)]
pub struct Utf8StrArr<'a> {
    mem: &'a [u8],
    addr: usize,
}

impl<'a> Utf8StrArr<'a> {
    /// View the table at `addr`.
    ///
    /// Pre: `addr` is non-null.
    pub fn new(mem: &'a [u8], addr: u32) -> Self {
        precondition!(addr != 0, "string array at null address");
        Self {
            mem,
            addr: addr as usize,
        }
    }

    /// View the table at `addr`, validating the whole block.
    ///
    /// Accepted blocks satisfy everything the unchecked accessors rely on,
    /// including `is_empty() == (len() == 0)`.
    pub fn try_new(mem: &'a [u8], addr: u32) -> Result<Self> {
        if addr == 0 {
            return Err(LayoutError::NullAddress);
        }
        let addr = addr as usize;
        let size = mem.len();

        if addr.saturating_add(PTR_SIZE) > size {
            return Err(LayoutError::OutOfBounds {
                addr,
                need: PTR_SIZE,
                size,
            });
        }

        let first = read_u32_le(mem, addr) as usize;
        if first < addr + PTR_SIZE || !(first - addr).is_multiple_of(PTR_SIZE) {
            return Err(LayoutError::MisalignedTable { addr, first });
        }
        if first > size {
            return Err(LayoutError::OutOfBounds {
                addr,
                need: first - addr,
                size,
            });
        }

        let view = Self { mem, addr };
        for index in 0..view.len() {
            let start = view.slot(index);
            let end = view.slot(index + 1);
            if end <= start {
                return Err(LayoutError::PointerOrder { index, start, end });
            }
            if end > size {
                return Err(LayoutError::OutOfBounds {
                    addr: start,
                    need: end - start,
                    size,
                });
            }
            if mem[end - 1] != 0 {
                return Err(LayoutError::MissingTerminator { index, at: end - 1 });
            }
        }

        Ok(view)
    }

    /// Address of the pointer table.
    pub fn addr(&self) -> u32 {
        self.addr as u32
    }

    /// Number of strings.
    pub fn len(&self) -> usize {
        let table = self.slot(0).saturating_sub(self.addr) / PTR_SIZE;
        table.saturating_sub(1)
    }

    /// Whether the table holds only the sentinel.
    ///
    /// Compares the first entry with the second slot's address instead of
    /// deriving the count.
    pub fn is_empty(&self) -> bool {
        self.slot(0) == self.addr + PTR_SIZE
    }

    /// Byte length of string `index`, terminator excluded.
    ///
    /// Pre: `index < len()`.
    pub fn str_len(&self, index: usize) -> usize {
        self.check_index(index);
        self.span(index).1
    }

    /// Bytes of string `index`, terminator excluded.
    ///
    /// Pre: `index < len()`.
    pub fn get(&self, index: usize) -> &'a [u8] {
        self.check_index(index);
        let (start, len) = self.span(index);
        &self.mem[start..start + len]
    }

    /// String `index` as UTF-8.
    ///
    /// Pre: `index < len()`.
    pub fn get_str(&self, index: usize) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.get(index))
    }

    /// Address of the first byte of string `index`.
    ///
    /// Pre: `index < len()`.
    pub fn str_addr(&self, index: usize) -> u32 {
        self.check_index(index);
        self.slot(index) as u32
    }

    /// Address one past the final terminator.
    pub fn end_addr(&self) -> u32 {
        self.slot(self.len()) as u32
    }

    pub fn iter(
        &self,
    ) -> impl ExactSizeIterator<Item = &'a [u8]> + DoubleEndedIterator + use<'a> {
        let this = *self;
        (0..self.len()).map(move |index| this.get(index))
    }

    /// The value stored in table entry `index`.
    #[inline]
    fn slot(&self, index: usize) -> usize {
        read_u32_le(self.mem, self.addr + index * PTR_SIZE) as usize
    }

    /// Start address and byte length of string `index`.
    #[inline]
    fn span(&self, index: usize) -> (usize, usize) {
        let start = self.slot(index);
        let end = self.slot(index + 1);
        (start, end.saturating_sub(start).saturating_sub(1))
    }

    #[inline]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn check_index(&self, index: usize) {
        precondition!(
            index < self.len(),
            "index {index} out of bounds for string array of length {}",
            self.len()
        );
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
impl fmt::Debug for Utf8StrArr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utf8StrArr")
            .field("addr", &format_args!("{:#x}", self.addr))
            .finish_non_exhaustive()
    }
}
