//! Fixed-size element encoding.

use std::fmt;

/// A value stored in linear memory as `SIZE` little-endian bytes.
pub trait Element: Copy + fmt::Debug {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode into the first `SIZE` bytes of `bytes`.
    fn write_le(self, bytes: &mut [u8]);
}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(buf)
                }

                #[inline]
                fn write_le(self, bytes: &mut [u8]) {
                    bytes[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_element!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// A wasm32 pointer: byte address into linear memory.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Ptr(pub u32);

impl Ptr {
    pub const NULL: Self = Self(0);

    #[inline]
    pub fn new(addr: u32) -> Self {
        Self(addr)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Element for Ptr {
    const SIZE: usize = 4;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        Self(u32::read_le(bytes))
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        self.0.write_le(bytes)
    }
}

/// A code unit of a NUL-terminated text encoding.
///
/// - `u8`: UTF-8 (`char`)
/// - `u16`: UTF-16 (`char16_t`)
/// - `u32`: UTF-32 (`char32_t`, and `wchar_t` on wasm32)
pub trait CharUnit: Element + PartialEq {
    /// The terminator unit.
    const NUL: Self;

    /// Decode units to a `String`, replacing invalid sequences with U+FFFD.
    fn decode_lossy(units: &[Self]) -> String;
}

impl CharUnit for u8 {
    const NUL: Self = 0;

    fn decode_lossy(units: &[Self]) -> String {
        String::from_utf8_lossy(units).into_owned()
    }
}

impl CharUnit for u16 {
    const NUL: Self = 0;

    fn decode_lossy(units: &[Self]) -> String {
        char::decode_utf16(units.iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl CharUnit for u32 {
    const NUL: Self = 0;

    fn decode_lossy(units: &[Self]) -> String {
        units
            .iter()
            .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}
