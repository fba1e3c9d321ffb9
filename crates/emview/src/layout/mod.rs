//! Binary layouts shared with wasm32 linear memory.
//!
//! Raw array block:
//!
//! ```text
//! addr                    addr + elements_offset
//! | length: u32 | padding | item 0 | item 1 | ... | item length-1 |
//! ```
//!
//! Padding is `size_of(item) - 4` bytes for items wider than the length
//! field, so the first item is naturally aligned; smaller items are packed.
//!
//! String array block (`N` strings):
//!
//! ```text
//! addr
//! | P0 | P1 | ... | PN | s0 bytes | 0 | s1 bytes | 0 | ... | s(N-1) bytes | 0 |
//!   |                   ^                                                  ^
//!   +-------------------+                                        PN points here
//! ```

mod element;
mod raw_array;
mod str_arr;
mod text;


pub use element::{CharUnit, Element, Ptr};
pub use raw_array::{Iter, RawArray};
pub use str_arr::Utf8StrArr;
pub use text::TextView;

/// Size of a wasm32 pointer in bytes.
pub const PTR_SIZE: usize = 4;

/// Size of the raw array length field in bytes.
pub const LENGTH_SIZE: usize = 4;

/// Padding between the length field and the first item of `elem_size` bytes.
pub const fn padding_for(elem_size: usize) -> usize {
    elem_size.saturating_sub(LENGTH_SIZE)
}

/// Offset of the first item from the start of a raw array block.
pub const fn elements_offset_for(elem_size: usize) -> usize {
    LENGTH_SIZE + padding_for(elem_size)
}

/// Offset of the first `T` from the start of a raw array block.
pub const fn elements_offset<T: Element>() -> usize {
    elements_offset_for(T::SIZE)
}

/// Read a little-endian u32 from bytes at the given offset.
#[inline]
pub(crate) fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
