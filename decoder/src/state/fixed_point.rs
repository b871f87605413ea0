//! Unsigned 64.64 fixed point numbers, as used by the mango lending indexes.
use std::fmt;

use crate::{cursor::read_u128, error::LayoutResult};

const FRACTIONAL_DENOMINATOR: f64 = 18_446_744_073_709_551_616.0; // 2^64

/// An unsigned fixed point number with 64 integer bits and 64 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct U64F64(u128);

impl U64F64 {
    /// Serialized size in bytes
    pub const LEN: usize = 16;

    #[allow(missing_docs)]
    pub const fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    /// Reads the 16 bytes at `offset`, low order (fractional) word first.
    pub fn read(data: &[u8], offset: usize) -> LayoutResult<Self> {
        read_u128(data, offset).map(Self)
    }

    #[allow(missing_docs)]
    pub const fn to_bits(self) -> u128 {
        self.0
    }

    #[allow(missing_docs)]
    pub const fn integer_part(self) -> u64 {
        (self.0 >> 64) as u64
    }

    #[allow(missing_docs)]
    pub const fn fractional_part(self) -> u64 {
        self.0 as u64
    }

    /// Lossy conversion, values needing more than 53 bits of mantissa are rounded.
    pub fn to_f64(self) -> f64 {
        self.integer_part() as f64 + self.fractional_part() as f64 / FRACTIONAL_DENOMINATOR
    }
}

impl From<u128> for U64F64 {
    fn from(bits: u128) -> Self {
        Self(bits)
    }
}

impl fmt::Display for U64F64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}
