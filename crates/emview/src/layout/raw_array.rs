//! Length-prefixed array view.

use std::fmt;
use std::iter::Map;
use std::marker::PhantomData;
use std::slice::ChunksExact;

use super::element::{CharUnit, Element};
use super::text::TextView;
use super::{elements_offset, read_u32_le};
use crate::{LayoutError, Result};

/// Iterator over raw array elements in storage order.
pub type Iter<'a, T> = Map<ChunksExact<'a, u8>, fn(&'a [u8]) -> T>;

/// View of a `{length: u32, padding, items: T[length]}` block.
///
/// `B` is the memory the block lives in. With `B: AsMut<[u8]>` (e.g.
/// `&mut [u8]`) the view also writes elements; the read accessors are the
/// same either way.
///
/// The length is read once at construction.
#[derive(Clone, Copy)]
pub struct RawArray<B, T> {
    mem: B,
    addr: usize,
    len: u32,
    _marker: PhantomData<T>,
}

impl<B: AsRef<[u8]>, T: Element> RawArray<B, T> {
    /// View the block at `addr`.
    ///
    /// Pre: the header lies inside `mem`. The items themselves are not
    /// checked; see [`try_new`](Self::try_new).
    pub fn new(mem: B, addr: u32) -> Self {
        let addr = addr as usize;
        let bytes = mem.as_ref();
        precondition!(
            addr + elements_offset::<T>() <= bytes.len(),
            "raw array header at {addr:#x} past end of memory ({} bytes)",
            bytes.len()
        );
        let len = read_u32_le(bytes, addr);
        Self {
            mem,
            addr,
            len,
            _marker: PhantomData,
        }
    }

    /// View the block at `addr`, checking that all of it lies inside `mem`.
    pub fn try_new(mem: B, addr: u32) -> Result<Self> {
        let addr = addr as usize;
        let size = mem.as_ref().len();

        let header = elements_offset::<T>();
        if addr.saturating_add(header) > size {
            return Err(LayoutError::OutOfBounds {
                addr,
                need: header,
                size,
            });
        }

        let len = read_u32_le(mem.as_ref(), addr);
        let need = (len as usize)
            .checked_mul(T::SIZE)
            .and_then(|items| items.checked_add(header))
            .unwrap_or(usize::MAX);
        if addr.saturating_add(need) > size {
            return Err(LayoutError::OutOfBounds { addr, need, size });
        }

        Ok(Self {
            mem,
            addr,
            len,
            _marker: PhantomData,
        })
    }

    /// Address of the length field.
    pub fn addr(&self) -> u32 {
        self.addr as u32
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the whole block, header and padding included.
    pub fn byte_len(&self) -> usize {
        elements_offset::<T>() + self.len() * T::SIZE
    }

    /// Item at `index`.
    ///
    /// Pre: `index < len()`.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        precondition!(
            index < self.len(),
            "index {index} out of bounds for raw array of length {}",
            self.len
        );
        T::read_le(&self.mem.as_ref()[self.item_pos(index)..])
    }

    /// Item at `index`, or `None` past the end.
    pub fn checked_get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        let pos = self.item_pos(index);
        let bytes = self.mem.as_ref().get(pos..pos + T::SIZE)?;
        Some(T::read_le(bytes))
    }

    /// Items in storage order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.elements_bytes()
            .chunks_exact(T::SIZE)
            .map(T::read_le as fn(&[u8]) -> T)
    }

    /// Encoded bytes of all items.
    pub fn elements_bytes(&self) -> &[u8] {
        let start = self.item_pos(0);
        &self.mem.as_ref()[start..start + self.len() * T::SIZE]
    }

    /// Read-only view borrowing the same memory.
    pub fn as_view(&self) -> RawArray<&[u8], T> {
        RawArray {
            mem: self.mem.as_ref(),
            addr: self.addr,
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// The memory the block lives in.
    pub fn memory(&self) -> &[u8] {
        self.mem.as_ref()
    }

    #[inline]
    fn item_pos(&self, index: usize) -> usize {
        self.addr + elements_offset::<T>() + index * T::SIZE
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, T: Element> RawArray<B, T> {
    /// Overwrite the item at `index`.
    ///
    /// Pre: `index < len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) {
        precondition!(
            index < self.len(),
            "index {index} out of bounds for raw array of length {}",
            self.len
        );
        let pos = self.item_pos(index);
        value.write_le(&mut self.mem.as_mut()[pos..]);
    }

    /// Mutable encoded bytes of all items.
    pub fn elements_bytes_mut(&mut self) -> &mut [u8] {
        let start = self.item_pos(0);
        let end = start + self.len() * T::SIZE;
        &mut self.mem.as_mut()[start..end]
    }
}

impl<B: AsRef<[u8]>, C: CharUnit> RawArray<B, C> {
    /// The stored text without its terminator (`len() - 1` units).
    pub fn text_view(&self) -> TextView<'_, C> {
        let start = self.item_pos(0);
        let units = self.len().saturating_sub(1);
        TextView::new(&self.mem.as_ref()[start..start + units * C::SIZE])
    }

    /// Owned copy of [`text_view`](Self::text_view).
    pub fn to_text(&self) -> Vec<C> {
        self.text_view().to_vec()
    }

    pub fn to_string_lossy(&self) -> String {
        self.text_view().to_string_lossy()
    }
}

impl<'a, B: AsRef<[u8]>, T: Element> IntoIterator for &'a RawArray<B, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
impl<B, T> fmt::Debug for RawArray<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawArray")
            .field("addr", &format_args!("{:#x}", self.addr))
            .field("len", &self.len)
            .finish()
    }
}
