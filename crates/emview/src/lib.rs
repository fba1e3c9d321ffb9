#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Zero-copy views over blocks that a wasm32 guest and its host share
//! through linear memory.
//!
//! Two layouts are supported:
//! - [`RawArray`]: a `u32` length followed by fixed-size elements
//! - [`Utf8StrArr`]: a pointer table followed by NUL-terminated strings
//!
//! Views borrow memory as a byte slice and never allocate. Addresses are
//! `u32` byte offsets into that slice, and all values are little-endian.
//!
//! # Example
//!
//! ```
//! use emview::RawArray;
//!
//! // addr 4: length = 3, then [7, 8, 9]
//! let mut mem = vec![0u8; 4];
//! mem.extend_from_slice(&3u32.to_le_bytes());
//! for v in [7u32, 8, 9] {
//!     mem.extend_from_slice(&v.to_le_bytes());
//! }
//!
//! let array = RawArray::<_, u32>::new(&mem[..], 4);
//! assert_eq!(array.len(), 3);
//! assert_eq!(array.iter().collect::<Vec<_>>(), [7, 8, 9]);
//! ```

/// Assert a caller-side precondition.
///
/// Checked only in builds with `debug_assertions` and without the
/// `unchecked` feature. A violated precondition never causes UB: at worst
/// a view reads neighbouring bytes or a slice index panics.
macro_rules! precondition {
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(all(debug_assertions, not(feature = "unchecked"))) {
            assert!($cond, $($arg)+);
        }
    };
}

mod error;
pub mod layout;

pub use error::LayoutError;
pub use layout::{
    CharUnit, Element, Iter, LENGTH_SIZE, PTR_SIZE, Ptr, RawArray, TextView, Utf8StrArr,
    elements_offset, elements_offset_for, padding_for,
};

/// Result type for checked view construction.
pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
