//! Linear memory with an aligned bump allocator.
//!
//! Allocation follows the guest-side helpers: reserve `size + alignment`
//! bytes at the current top, then round the start up to the next multiple
//! of `alignment`. The start always moves by at least one byte, so every
//! block keeps `alignment` bytes of slack to absorb the rounding.
//!
//! Blocks are freed in two ways. Heap-style, [`free`](LinearMemory::free)
//! returns one block's span to a free list that later allocations reuse
//! first-fit, in any order. Stack-style, take a [`Mark`], allocate, then
//! [`release`](LinearMemory::release) everything above the mark.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use emview::{Element, LayoutError, Ptr, RawArray, Utf8StrArr};

use crate::{MemoryConfig, MemoryError, Result};

/// A block handed out by [`LinearMemory::alloc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Start of the reserved span, before alignment.
    original: u32,
    /// Aligned start of the block.
    addr: u32,
    size: usize,
    /// Bytes reserved from `original`, alignment slack included.
    span: usize,
}

impl Allocation {
    /// Aligned address of the block.
    pub fn addr(&self) -> u32 {
        self.addr
    }

    pub fn ptr(&self) -> Ptr {
        Ptr(self.addr)
    }

    /// Address the allocator reserved from, before alignment.
    pub fn original(&self) -> u32 {
        self.original
    }

    /// Requested size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// One past the last requested byte.
    pub fn end(&self) -> u32 {
        self.addr + self.size as u32
    }
}

/// Allocator position saved by [`LinearMemory::mark`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(u32);

/// Byte-addressed memory shared with views through [`as_slice`](Self::as_slice).
///
/// Addresses are `u32` offsets. The first `reserved` bytes are never
/// allocated, so address `0` can stand for null.
pub struct LinearMemory {
    bytes: Vec<u8>,
    /// Next free byte.
    top: usize,
    /// Freed spans below `top`, start -> length. Never adjacent.
    free_spans: BTreeMap<usize, usize>,
    config: MemoryConfig,
}

impl LinearMemory {
    pub fn new(config: MemoryConfig) -> Self {
        let config = config.clamped();
        log::debug!(
            "linear memory: {} bytes, growing up to {}",
            config.initial_size,
            config.max_size
        );
        Self {
            bytes: vec![0; config.initial_size],
            top: config.reserved as usize,
            free_spans: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Current size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Next address the allocator bumps from.
    pub fn top(&self) -> u32 {
        self.top as u32
    }

    /// Bytes below [`top`](Self::top) freed and available for reuse.
    pub fn free_len(&self) -> usize {
        self.free_spans.values().sum()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Allocate `size` bytes aligned to `alignment`.
    ///
    /// Reuses the first freed span that fits, otherwise bumps `top`. Memory
    /// grows in whole pages up to `max_size`. The block's contents are
    /// whatever the span last held (zero if never used).
    pub fn alloc(&mut self, alignment: u32, size: usize) -> Result<Allocation> {
        if !alignment.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment(alignment));
        }
        let align = alignment as usize;
        let span = size
            .checked_add(align)
            .ok_or(MemoryError::TooLarge(size))?;
        let original = match self.take_free(span) {
            Some(start) => start,
            None => self.bump(span)?,
        };

        let addr = original + align - original % align;
        log::trace!("alloc {size} bytes (align {alignment}) at {addr:#x}");
        Ok(Allocation {
            original: original as u32,
            addr: addr as u32,
            size,
            span,
        })
    }

    /// Return `block` to the allocator.
    ///
    /// Blocks may be freed in any order. A freed span that reaches `top`
    /// lowers it; any other span joins the free list, merged with its
    /// neighbours.
    pub fn free(&mut self, block: Allocation) {
        let mut start = block.original as usize;
        let mut len = block.span;
        debug_assert!(
            start + len <= self.top,
            "free of block at {:#x} above allocator top {:#x}",
            block.addr,
            self.top
        );
        debug_assert!(
            !self.overlaps_free(start, len),
            "double free of block at {:#x}",
            block.addr
        );

        if let Some(next) = self.free_spans.remove(&(start + len)) {
            len += next;
        }
        let before = self.free_spans.range(..start).next_back();
        if let Some((&prev, &prev_len)) = before
            && prev + prev_len == start
        {
            self.free_spans.remove(&prev);
            start = prev;
            len += prev_len;
        }

        if start + len >= self.top {
            self.top = start;
        } else {
            self.free_spans.insert(start, len);
        }
        log::trace!("free {:#x}: span {start:#x}+{len}", block.addr);
    }

    /// Save the allocator position.
    pub fn mark(&self) -> Mark {
        Mark(self.top as u32)
    }

    /// Free every block allocated at or above `mark`.
    ///
    /// Blocks reused from the free list below `mark` stay allocated.
    pub fn release(&mut self, mark: Mark) {
        let mark = mark.0 as usize;
        if mark >= self.top {
            return;
        }
        log::trace!("release {:#x} -> {mark:#x}", self.top);
        self.top = mark;
        self.free_spans.retain(|&start, _| start < mark);
        let last = self.free_spans.last_key_value();
        if let Some((&start, &len)) = last
            && start + len >= mark
        {
            self.free_spans.remove(&start);
            self.top = start;
        }
    }

    pub fn read<T: Element>(&self, addr: u32) -> Result<T> {
        let range = self.range(addr, T::SIZE)?;
        Ok(T::read_le(&self.bytes[range]))
    }

    pub fn write<T: Element>(&mut self, addr: u32, value: T) -> Result<()> {
        let range = self.range(addr, T::SIZE)?;
        value.write_le(&mut self.bytes[range]);
        Ok(())
    }

    /// Write `items` back to back starting at `addr`.
    pub fn write_array<T: Element>(&mut self, addr: u32, items: &[T]) -> Result<()> {
        let len = items
            .len()
            .checked_mul(T::SIZE)
            .ok_or(MemoryError::TooLarge(items.len()))?;
        let range = self.range(addr, len)?;
        for (chunk, item) in self.bytes[range].chunks_exact_mut(T::SIZE).zip(items) {
            item.write_le(chunk);
        }
        Ok(())
    }

    pub fn read_bytes(&self, addr: u32, len: usize) -> Result<&[u8]> {
        let range = self.range(addr, len)?;
        Ok(&self.bytes[range])
    }

    pub fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> Result<()> {
        let range = self.range(addr, bytes.len())?;
        self.bytes[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Checked view of the raw array block at `addr`.
    pub fn raw_array<T: Element>(&self, addr: u32) -> Result<RawArray<&[u8], T>, LayoutError> {
        RawArray::try_new(self.as_slice(), addr)
    }

    /// Checked mutable view of the raw array block at `addr`.
    pub fn raw_array_mut<T: Element>(
        &mut self,
        addr: u32,
    ) -> Result<RawArray<&mut [u8], T>, LayoutError> {
        RawArray::try_new(self.as_mut_slice(), addr)
    }

    /// Checked view of the string array block at `addr`.
    pub fn str_arr(&self, addr: u32) -> Result<Utf8StrArr<'_>, LayoutError> {
        Utf8StrArr::try_new(self.as_slice(), addr)
    }

    fn range(&self, addr: u32, len: usize) -> Result<Range<usize>> {
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(MemoryError::OutOfBounds {
                addr,
                len,
                size: self.bytes.len(),
            }),
        }
    }

    /// Reserve `span` bytes at `top`.
    fn bump(&mut self, span: usize) -> Result<usize> {
        let original = self.top;
        let end = original
            .checked_add(span)
            .filter(|&end| end <= self.config.max_size)
            .ok_or(MemoryError::OutOfMemory {
                requested: span,
                top: original,
                limit: self.config.max_size,
            })?;

        self.grow_to(end);
        self.top = end;
        Ok(original)
    }

    /// First-fit search of the free list. Splits off the unused tail.
    fn take_free(&mut self, span: usize) -> Option<usize> {
        let (&start, &len) = self.free_spans.iter().find(|&(_, &len)| len >= span)?;
        self.free_spans.remove(&start);
        if len > span {
            self.free_spans.insert(start + span, len - span);
        }
        Some(start)
    }

    fn overlaps_free(&self, start: usize, len: usize) -> bool {
        self.free_spans
            .range(..start + len)
            .next_back()
            .is_some_and(|(&s, &l)| s + l > start)
    }

    fn grow_to(&mut self, end: usize) {
        if end <= self.bytes.len() {
            return;
        }
        let new_len = end
            .div_ceil(MemoryConfig::PAGE_SIZE)
            .saturating_mul(MemoryConfig::PAGE_SIZE)
            .min(self.config.max_size);
        log::debug!("grow linear memory {} -> {new_len} bytes", self.bytes.len());
        self.bytes.resize(new_len, 0);
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
impl fmt::Debug for LinearMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearMemory")
            .field("len", &self.bytes.len())
            .field("top", &format_args!("{:#x}", self.top))
            .field("free_spans", &self.free_spans.len())
            .field("max_size", &self.config.max_size)
            .finish()
    }
}
