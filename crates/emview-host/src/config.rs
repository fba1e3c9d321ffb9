//! Linear memory configuration.

/// Configuration for [`LinearMemory`](crate::LinearMemory).
///
/// Values are clamped at construction: `max_size` never exceeds the
/// 32-bit address space and `reserved` is at least one byte, so no
/// allocation can sit at address `0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Bytes allocated up front.
    ///
    /// Default: one wasm page (64 KiB).
    pub initial_size: usize,

    /// Upper bound for growth in bytes.
    ///
    /// Default: 4 GiB - 1, the whole wasm32 address space.
    pub max_size: usize,

    /// Low bytes never handed out by the allocator.
    ///
    /// Default: 16. Keeps address `0` free so it can stand for null.
    pub reserved: u32,
}

impl MemoryConfig {
    /// Size of a wasm memory page. Memory grows in whole pages.
    pub const PAGE_SIZE: usize = 65_536;

    /// Largest addressable size.
    pub const MAX_SIZE: usize = u32::MAX as usize;

    pub const DEFAULT_RESERVED: u32 = 16;

    /// Config with the given growth limit and defaults otherwise.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    /// The config with every value brought into range.
    pub(crate) fn clamped(&self) -> Self {
        let max_size = self.max_size.min(Self::MAX_SIZE);
        let reserved = self.reserved.max(1);
        Self {
            initial_size: self.initial_size.max(reserved as usize).min(max_size),
            max_size,
            reserved,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            initial_size: Self::PAGE_SIZE,
            max_size: Self::MAX_SIZE,
            reserved: Self::DEFAULT_RESERVED,
        }
    }
}
