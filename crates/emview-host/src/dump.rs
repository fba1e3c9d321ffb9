//! Human-readable dump of layout blocks for debugging and tests.
//!
//! ```text
//! [raw_array]
//! addr = 0x0014
//! len = 2
//! elem_size = 4
//! elements_offset = 4
//!
//! [elements]
//! 0 7
//! 1 8
//! ```

use std::fmt::Write as _;

use emview::{Element, RawArray, Utf8StrArr, elements_offset};

/// Dump a raw array block: header fields, then one line per item.
pub fn dump_raw_array<B: AsRef<[u8]>, T: Element>(array: &RawArray<B, T>) -> String {
    let mut out = String::new();

    out.push_str("[raw_array]\n");
    writeln!(out, "addr = {:#06x}", array.addr()).unwrap();
    writeln!(out, "len = {}", array.len()).unwrap();
    writeln!(out, "elem_size = {}", T::SIZE).unwrap();
    writeln!(out, "elements_offset = {}", elements_offset::<T>()).unwrap();
    out.push('\n');

    out.push_str("[elements]\n");
    let width = width_for_count(array.len());
    for (i, item) in array.iter().enumerate() {
        writeln!(out, "{i:0width$} {item:?}").unwrap();
    }

    out
}

/// Dump a string array block: one line per string with its address.
///
/// Non-ASCII and control bytes are escaped.
pub fn dump_str_arr(strs: &Utf8StrArr<'_>) -> String {
    let mut out = String::new();

    out.push_str("[str_arr]\n");
    writeln!(out, "addr = {:#06x}", strs.addr()).unwrap();
    writeln!(out, "len = {}", strs.len()).unwrap();
    out.push('\n');

    out.push_str("[strings]\n");
    let width = width_for_count(strs.len());
    for i in 0..strs.len() {
        writeln!(
            out,
            "{i:0width$} @{:#06x} \"{}\"",
            strs.str_addr(i),
            strs.get(i).escape_ascii()
        )
        .unwrap();
    }

    out
}

/// Minimum width needed to display indices up to `count - 1`.
pub(crate) fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        (count - 1).ilog10() as usize + 1
    }
}
