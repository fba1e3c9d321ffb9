//! Host memory errors.

/// Errors from allocating in or accessing [`LinearMemory`](crate::LinearMemory).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("out of memory: need {requested} bytes past {top:#x}, limit {limit}")]
    OutOfMemory {
        requested: usize,
        top: usize,
        limit: usize,
    },

    #[error("invalid alignment: {0} (must be a power of two)")]
    InvalidAlignment(u32),

    #[error("access of {len} bytes at {addr:#x} past end of memory ({size} bytes)")]
    OutOfBounds { addr: u32, len: usize, size: usize },

    /// A block or item count does not fit the 32-bit address space.
    #[error("too large for wasm32 memory: {0}")]
    TooLarge(usize),
}
