//! Read cursor
//!
//! Decodes one record: the 4-byte count, then delta-encoded varints,
//! following the record across page boundaries.

use std::sync::Arc;

use crate::codec::{varint_overflows, LENGTH_PREFIX_LEN, MAX_VARINT_LEN};
use crate::error::{AtlasError, Result};
use crate::page::PageTable;

use super::window::PageWindow;

/// Reusable decoder for delta-encoded records
///
/// Yields the running sum of the stored deltas. `None` marks the end of the
/// record, and is also returned when the pages run out mid-value or a varint
/// is malformed; after that the cursor keeps returning `None` until it is
/// repositioned with [`ReadCursor::init`].
pub struct ReadCursor {
    window: PageWindow,
    current_target: u32,
    max_targets: u32,
    delta: u64,
}

impl ReadCursor {
    pub(crate) fn new(table: Arc<PageTable>) -> Self {
        Self {
            window: PageWindow::new(table),
            current_target: 0,
            max_targets: 0,
            delta: 0,
        }
    }

    /// Position on the record starting at `from` and read its count
    ///
    /// The record length is unknown until decoded, so the window spans the
    /// rest of the addressable space.
    pub fn init(&mut self, from: u64) -> Result<()> {
        let table = self.window.table();
        if table.is_released() {
            return Err(AtlasError::Released);
        }
        let capacity = table.capacity();
        if from >= capacity {
            return Err(AtlasError::IndexOutOfBounds {
                index: from,
                capacity,
            });
        }

        self.window.init(from, capacity - from);
        self.current_target = 0;
        self.max_targets = 0;
        self.delta = 0;

        if !self.window.advance() {
            return Ok(());
        }
        self.max_targets = if self.window.remaining() >= LENGTH_PREFIX_LEN {
            let mut bytes = [0u8; LENGTH_PREFIX_LEN];
            self.window.take_slice(&mut bytes);
            u32::from_be_bytes(bytes)
        } else {
            self.read_length_slow()
        };
        Ok(())
    }

    /// Count split across two pages; zero if the second page is missing
    fn read_length_slow(&mut self) -> u32 {
        let mut bytes = [0u8; LENGTH_PREFIX_LEN];
        let head = self.window.remaining();
        debug_assert!(head < LENGTH_PREFIX_LEN, "invalid boundary: {} bytes left", head);

        self.window.take_slice(&mut bytes[..head]);
        if !self.window.advance() || self.window.remaining() < LENGTH_PREFIX_LEN - head {
            return 0;
        }
        self.window.take_slice(&mut bytes[head..]);
        u32::from_be_bytes(bytes)
    }

    /// Number of values in the current record
    pub fn len(&self) -> usize {
        self.max_targets as usize
    }

    pub fn is_empty(&self) -> bool {
        self.max_targets == 0
    }

    /// Values not yet returned
    pub fn remaining(&self) -> usize {
        (self.max_targets - self.current_target) as usize
    }

    pub(crate) fn belongs_to(&self, table: &Arc<PageTable>) -> bool {
        Arc::ptr_eq(self.window.table(), table)
    }

    /// Drop the page handle so a parked cursor does not pin memory
    pub(crate) fn clear(&mut self) {
        self.window.clear();
        self.current_target = 0;
        self.max_targets = 0;
        self.delta = 0;
    }

    fn finish(&mut self) {
        self.current_target = self.max_targets;
        self.window.clear();
    }

    // =========================================================================
    // Varint decoding
    // =========================================================================

    fn quick_get_varint(&mut self) -> Option<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.window.take();
            if varint_overflows(i, byte) {
                return self.malformed_varint();
            }
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Some(value);
            }
        }
        self.malformed_varint()
    }

    fn slow_get_varint(&mut self) -> Option<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            while self.window.remaining() == 0 {
                if !self.window.advance() {
                    return None;
                }
            }
            let byte = self.window.take();
            if varint_overflows(i, byte) {
                return self.malformed_varint();
            }
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Some(value);
            }
        }
        self.malformed_varint()
    }

    fn malformed_varint(&self) -> Option<u64> {
        tracing::warn!(
            target_index = self.current_target,
            "varint longer than {} bytes or wider than 64 bits",
            MAX_VARINT_LEN
        );
        None
    }
}

impl Iterator for ReadCursor {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.current_target >= self.max_targets {
            return None;
        }

        let raw = if self.window.remaining() >= MAX_VARINT_LEN {
            self.quick_get_varint()
        } else {
            self.slow_get_varint()
        };

        match raw {
            Some(raw) => {
                self.delta = self.delta.wrapping_add(raw);
                self.current_target += 1;
                Some(self.delta)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl std::fmt::Debug for ReadCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadCursor")
            .field("current_target", &self.current_target)
            .field("max_targets", &self.max_targets)
            .field("delta", &self.delta)
            .finish()
    }
}
