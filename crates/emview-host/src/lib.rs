#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Host side of the emview layouts.
//!
//! - [`LinearMemory`]: a growable wasm32-style memory with an aligned bump
//!   allocator and typed little-endian access
//! - [`alloc_raw_array`], [`alloc_str_arr`]: lay out blocks the
//!   [`emview`] views read
//! - [`dump`]: human-readable rendering of blocks for debugging
//!
//! # Example
//!
//! ```
//! use emview_host::{LinearMemory, MemoryConfig, alloc_str_arr};
//!
//! let mut mem = LinearMemory::new(MemoryConfig::default());
//! let block = alloc_str_arr(&mut mem, &["ab", "c"]).unwrap();
//!
//! let strs = mem.str_arr(block.addr()).unwrap();
//! assert_eq!(strs.len(), 2);
//! assert_eq!(strs.get(0), b"ab");
//! ```

mod config;
pub mod dump;
mod error;
mod memory;
mod writer;

#[cfg(test)]
mod memory_tests;

pub use config::MemoryConfig;
pub use error::MemoryError;
pub use memory::{Allocation, LinearMemory, Mark};
pub use writer::{alloc_raw_array, alloc_str_arr, alloc_text, alloc_utf8, alloc_utf16};

/// Result type for host memory operations.
pub type Result<T, E = MemoryError> = std::result::Result<T, E>;
