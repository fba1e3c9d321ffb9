//! Layout validation errors.

/// A block in memory does not match the layout its view expects.
///
/// Returned only by the checked constructors (`try_new`). The unchecked
/// constructors treat the same conditions as caller preconditions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("null block address")]
    NullAddress,

    #[error("block at {addr:#x} needs {need} bytes, memory holds {size}")]
    OutOfBounds { addr: usize, need: usize, size: usize },

    /// The first table entry does not point to a slot boundary past the table.
    #[error("pointer table at {addr:#x} is misaligned: first string at {first:#x}")]
    MisalignedTable { addr: usize, first: usize },

    /// Consecutive table entries leave no room for the terminator.
    #[error("string {index} has pointers out of order: {start:#x}..{end:#x}")]
    PointerOrder {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("string {index} is missing its terminator at {at:#x}")]
    MissingTerminator { index: usize, at: usize },
}
