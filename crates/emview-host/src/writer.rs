//! Writers that lay out blocks for the emview views.

use emview::{CharUnit, Element, PTR_SIZE, Ptr, elements_offset};

use crate::{Allocation, LinearMemory, MemoryError, Result};

/// Allocate a raw array block holding `items`.
///
/// The block is aligned to the item size (at least 4), so both the length
/// field and the items sit on natural boundaries.
pub fn alloc_raw_array<T: Element>(
    mem: &mut LinearMemory,
    items: &[T],
) -> Result<Allocation> {
    let len = u32::try_from(items.len()).map_err(|_| MemoryError::TooLarge(items.len()))?;
    let offset = elements_offset::<T>();
    let size = items
        .len()
        .checked_mul(T::SIZE)
        .and_then(|bytes| bytes.checked_add(offset))
        .ok_or(MemoryError::TooLarge(items.len()))?;
    let alignment =
        u32::try_from(offset.next_power_of_two()).map_err(|_| MemoryError::TooLarge(offset))?;

    let block = mem.alloc(alignment, size)?;
    mem.write(block.addr(), len)?;
    mem.write_array(block.addr() + offset as u32, items)?;

    log::debug!(
        "raw array: {len} x {} bytes at {:#x}",
        T::SIZE,
        block.addr()
    );
    Ok(block)
}

/// Allocate a raw array of `units` plus a terminator unit.
///
/// The block's length counts the terminator, as the text accessors expect.
pub fn alloc_text<C: CharUnit>(
    mem: &mut LinearMemory,
    units: &[C],
) -> Result<Allocation> {
    let mut items = Vec::with_capacity(units.len() + 1);
    items.extend_from_slice(units);
    items.push(C::NUL);
    alloc_raw_array(mem, &items)
}

pub fn alloc_utf8(mem: &mut LinearMemory, text: &str) -> Result<Allocation> {
    alloc_text(mem, text.as_bytes())
}

pub fn alloc_utf16(mem: &mut LinearMemory, text: &str) -> Result<Allocation> {
    let units: Vec<u16> = text.encode_utf16().collect();
    alloc_text(mem, &units)
}

/// Allocate a string array block holding `strings`.
///
/// Writes `strings.len() + 1` pointers, then each string's bytes and a
/// `0` terminator. The last pointer is one past the final terminator.
/// Interior `0` bytes are copied as-is; lengths come from the pointers.
pub fn alloc_str_arr<S: AsRef<[u8]>>(
    mem: &mut LinearMemory,
    strings: &[S],
) -> Result<Allocation> {
    let table = strings
        .len()
        .checked_add(1)
        .and_then(|slots| slots.checked_mul(PTR_SIZE))
        .ok_or(MemoryError::TooLarge(strings.len()))?;
    let data = strings
        .iter()
        .try_fold(0usize, |total, s| total.checked_add(s.as_ref().len() + 1))
        .ok_or(MemoryError::TooLarge(strings.len()))?;
    let size = table
        .checked_add(data)
        .ok_or(MemoryError::TooLarge(data))?;

    let block = mem.alloc(PTR_SIZE as u32, size)?;

    let mut slot = block.addr();
    let mut cursor = block.addr() + table as u32;
    for s in strings {
        let bytes = s.as_ref();
        mem.write(slot, Ptr(cursor))?;
        mem.write_bytes(cursor, bytes)?;
        cursor += bytes.len() as u32;
        mem.write(cursor, 0u8)?;
        cursor += 1;
        slot += PTR_SIZE as u32;
    }
    mem.write(slot, Ptr(cursor))?;

    log::debug!(
        "string array: {} strings, {size} bytes at {:#x}",
        strings.len(),
        block.addr()
    );
    Ok(block)
}
