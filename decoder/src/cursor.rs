//! Bounds-checked little-endian access to account buffers.
//!
//! Every reader takes the buffer and an absolute offset and fails with
//! [`LayoutError::OutOfBounds`] instead of panicking when the read would run past the end.
use log::warn;
use solana_program::pubkey::Pubkey;

use crate::error::{LayoutError, LayoutResult};

/// The ASCII prefix carried by every serum dex account.
pub const SERUM_MAGIC: &[u8; 5] = b"serum";

#[allow(missing_docs)]
pub const U32_SIZE: usize = 4;
#[allow(missing_docs)]
pub const U64_SIZE: usize = 8;
#[allow(missing_docs)]
pub const U128_SIZE: usize = 16;
#[allow(missing_docs)]
pub const PUBKEY_SIZE: usize = 32;

/// Returns the `width` bytes starting at `offset`.
pub fn read_bytes(data: &[u8], offset: usize, width: usize) -> LayoutResult<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| data.get(offset..end))
        .ok_or(LayoutError::OutOfBounds {
            offset,
            width,
            len: data.len(),
        })
}

/// Copies `N` bytes starting at `offset` into a fixed size array.
pub fn read_array<const N: usize>(data: &[u8], offset: usize) -> LayoutResult<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(read_bytes(data, offset, N)?);
    Ok(out)
}

/// Reads the byte at `offset`.
pub fn read_u8(data: &[u8], offset: usize) -> LayoutResult<u8> {
    Ok(read_array::<1>(data, offset)?[0])
}

/// Reads a little-endian `u32` at `offset`.
pub fn read_u32(data: &[u8], offset: usize) -> LayoutResult<u32> {
    read_array(data, offset).map(u32::from_le_bytes)
}

/// Reads a little-endian `u64` at `offset`.
pub fn read_u64(data: &[u8], offset: usize) -> LayoutResult<u64> {
    read_array(data, offset).map(u64::from_le_bytes)
}

/// Reads a little-endian `i64` at `offset`.
pub fn read_i64(data: &[u8], offset: usize) -> LayoutResult<i64> {
    read_array(data, offset).map(i64::from_le_bytes)
}

/// Reads a little-endian `u128` at `offset`.
pub fn read_u128(data: &[u8], offset: usize) -> LayoutResult<u128> {
    read_array(data, offset).map(u128::from_le_bytes)
}

/// Reads the 32 byte public key at `offset`.
pub fn read_pubkey(data: &[u8], offset: usize) -> LayoutResult<Pubkey> {
    read_array::<PUBKEY_SIZE>(data, offset).map(Pubkey::new_from_array)
}

/// Reads `count` consecutive public keys starting at `offset`.
pub fn read_pubkeys(data: &[u8], offset: usize, count: usize) -> LayoutResult<Vec<Pubkey>> {
    (0..count)
        .map(|i| read_pubkey(data, offset + i * PUBKEY_SIZE))
        .collect()
}

/// Returns the mutable window of `width` bytes starting at `offset`.
fn window_mut(data: &mut [u8], offset: usize, width: usize) -> LayoutResult<&mut [u8]> {
    let len = data.len();
    offset
        .checked_add(width)
        .and_then(move |end| data.get_mut(offset..end))
        .ok_or(LayoutError::OutOfBounds { offset, width, len })
}

/// Copies `bytes` into the buffer starting at `offset`.
pub fn write_bytes(data: &mut [u8], offset: usize, bytes: &[u8]) -> LayoutResult {
    window_mut(data, offset, bytes.len())?.copy_from_slice(bytes);
    Ok(())
}

/// Writes a single byte at `offset`.
pub fn write_u8(data: &mut [u8], offset: usize, value: u8) -> LayoutResult {
    write_bytes(data, offset, &[value])
}

/// Writes `value` as a little-endian `u16` at `offset`.
pub fn write_u16(data: &mut [u8], offset: usize, value: u16) -> LayoutResult {
    write_bytes(data, offset, &value.to_le_bytes())
}

/// Writes `value` as a little-endian `u32` at `offset`.
pub fn write_u32(data: &mut [u8], offset: usize, value: u32) -> LayoutResult {
    write_bytes(data, offset, &value.to_le_bytes())
}

/// Writes `value` as a little-endian `i32` at `offset`.
pub fn write_i32(data: &mut [u8], offset: usize, value: i32) -> LayoutResult {
    write_bytes(data, offset, &value.to_le_bytes())
}

/// Writes `value` as a little-endian `u64` at `offset`.
pub fn write_u64(data: &mut [u8], offset: usize, value: u64) -> LayoutResult {
    write_bytes(data, offset, &value.to_le_bytes())
}

/// Verifies that the buffer starts with the "serum" padding.
pub fn check_magic(data: &[u8]) -> LayoutResult {
    if !data.starts_with(SERUM_MAGIC) {
        warn!("The account data is missing the serum padding!");
        return Err(LayoutError::InvalidMagic);
    }
    Ok(())
}

/// Verifies that the buffer spans at least `min` bytes.
pub fn check_min_len(data: &[u8], min: usize) -> LayoutResult {
    if data.len() < min {
        warn!(
            "The account data is too small! ({} < {} bytes)",
            data.len(),
            min
        );
        return Err(LayoutError::AccountTooSmall {
            len: data.len(),
            min,
        });
    }
    Ok(())
}
