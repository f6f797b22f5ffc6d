//! Record codec
//!
//! Contiguous-buffer form of the record format, plus the size arithmetic the
//! paged cursors rely on.
//!
//! ## Record Format
//! ```text
//! ┌──────────────────┬──────────┬──────────┬─────┬──────────┐
//! │ Count: u32 (BE)  │ varint 0 │ varint 1 │ ... │ varint N │
//! └──────────────────┴──────────┴──────────┴─────┴──────────┘
//!
//! varint  := LEB128, 7 payload bits per byte, 0x80 = more bytes follow,
//!            least significant group first
//! value i := varint i + value (i - 1), value (-1) = 0
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{AtlasError, Result};

/// Size of the big-endian count that starts every record
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Longest LEB128 encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

/// Encoded length of `value` in bytes: `ceil(bit_length / 7)`, at least 1
#[inline]
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Total encoded size of a record holding `targets`
///
/// Fails if `targets` is not non-decreasing or has more than `u32::MAX`
/// entries.
pub fn record_len(targets: &[u64]) -> Result<u64> {
    check_count(targets)?;
    let mut len = LENGTH_PREFIX_LEN as u64;
    let mut previous = 0u64;
    for (i, &target) in targets.iter().enumerate() {
        let delta = delta_at(i, previous, target)?;
        len += varint_len(delta) as u64;
        previous = target;
    }
    Ok(len)
}

/// Encode `targets` as a record into a contiguous buffer
pub fn encode_record(targets: &[u64], out: &mut BytesMut) -> Result<()> {
    let count = check_count(targets)?;
    out.reserve(LENGTH_PREFIX_LEN + targets.len());
    out.put_u32(count);

    let mut previous = 0u64;
    for (i, &target) in targets.iter().enumerate() {
        put_varint(out, delta_at(i, previous, target)?);
        previous = target;
    }
    Ok(())
}

/// Decode one record from the front of `src`
///
/// Returns the decoded values and the number of bytes consumed.
pub fn decode_record(src: &[u8]) -> Result<(Vec<u64>, usize)> {
    let mut buf = src;
    if buf.remaining() < LENGTH_PREFIX_LEN {
        return Err(AtlasError::InvalidRecord(format!(
            "truncated length prefix: {} bytes",
            buf.remaining()
        )));
    }
    let count = buf.get_u32() as usize;

    // Every varint takes at least one byte
    let mut values = Vec::with_capacity(count.min(buf.remaining()));
    let mut delta = 0u64;
    for i in 0..count {
        let raw = get_varint(&mut buf).ok_or_else(|| {
            AtlasError::InvalidRecord(format!("truncated or over-long varint at value {}", i))
        })?;
        delta = delta.wrapping_add(raw);
        values.push(delta);
    }

    Ok((values, src.len() - buf.remaining()))
}

/// Append the LEB128 form of `value`
pub fn put_varint(out: &mut impl BufMut, mut value: u64) {
    while value & !0x7F != 0 {
        out.put_u8((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.put_u8(value as u8);
}

/// Read one LEB128 value, `None` if the input ends early, runs past
/// `MAX_VARINT_LEN` bytes, or does not fit in a `u64`
pub fn get_varint(buf: &mut impl Buf) -> Option<u64> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return None;
        }
        let byte = buf.get_u8();
        if varint_overflows(i, byte) {
            return None;
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Some(value);
        }
    }
    None
}

/// The last byte of a maximal varint carries only bit 63
#[inline]
pub(crate) fn varint_overflows(index: usize, byte: u8) -> bool {
    index == MAX_VARINT_LEN - 1 && byte > 1
}

fn check_count(targets: &[u64]) -> Result<u32> {
    u32::try_from(targets.len()).map_err(|_| {
        AtlasError::InvalidRecord(format!(
            "record holds {} targets, max is {}",
            targets.len(),
            u32::MAX
        ))
    })
}

fn delta_at(position: usize, previous: u64, target: u64) -> Result<u64> {
    target.checked_sub(previous).ok_or_else(|| {
        AtlasError::InvalidRecord(format!(
            "targets must be non-decreasing: {} follows {} at position {}",
            target, previous, position
        ))
    })
}
