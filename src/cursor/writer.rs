//! Write cursor
//!
//! Encodes fixed-width and LEB128 integers into an allocated region, splitting
//! values across page boundaries when needed.

use std::sync::Arc;

use crate::codec::MAX_VARINT_LEN;
use crate::error::{AtlasError, Result};
use crate::page::PageTable;

use super::window::PageWindow;

/// Sequential writer over one allocation region
///
/// Writing past the end of the region stops silently: callers size the
/// region up front (see [`crate::codec::record_len`]).
pub struct WriteCursor {
    window: PageWindow,
}

impl WriteCursor {
    pub(crate) fn new(table: Arc<PageTable>) -> Self {
        Self {
            window: PageWindow::new(table),
        }
    }

    /// Position on `[from, from + length)`, growing the page table to cover it
    pub fn init(&mut self, from: u64, length: u64) -> Result<()> {
        let end = from
            .checked_add(length)
            .ok_or(AtlasError::CapacityOverflow { requested: u64::MAX })?;
        self.window.table().grow(end)?;
        self.window.init(from, length);
        let loaded = self.window.advance();
        debug_assert!(
            loaded || length == 0,
            "no page backs [{}, {}) after growth",
            from,
            end
        );
        Ok(())
    }

    pub(crate) fn belongs_to(&self, table: &Arc<PageTable>) -> bool {
        Arc::ptr_eq(self.window.table(), table)
    }

    /// Bytes left in the current page window
    pub fn remaining(&self) -> usize {
        self.window.remaining()
    }

    /// Logical offset of the next byte to be written
    pub fn position(&self) -> Option<u64> {
        self.window.position()
    }

    // =========================================================================
    // Fixed-width
    // =========================================================================

    /// Write `value` as 4 big-endian bytes
    pub fn add_fixed32(&mut self, value: u32) {
        let bytes = value.to_be_bytes();
        if self.window.remaining() >= 4 {
            self.window.put_slice(&bytes);
        } else {
            self.slow_add_fixed32(bytes);
        }
    }

    fn slow_add_fixed32(&mut self, bytes: [u8; 4]) {
        let head = self.window.remaining();
        debug_assert!(head < 4, "invalid boundary: {} bytes left", head);

        self.window.put_slice(&bytes[..head]);
        if !self.window.advance() {
            return;
        }
        self.window.put_slice(&bytes[head..]);
    }

    // =========================================================================
    // Varint
    // =========================================================================

    /// Write `value` as an unsigned LEB128 varint
    pub fn add_varint(&mut self, value: u64) {
        if self.window.remaining() >= MAX_VARINT_LEN {
            self.quick_add_varint(value);
        } else {
            self.slow_add_varint(value);
        }
    }

    fn quick_add_varint(&mut self, mut value: u64) {
        while value & !0x7F != 0 {
            self.window.put((value & 0x7F) as u8 | 0x80);
            value >>= 7;
        }
        self.window.put(value as u8);
    }

    fn slow_add_varint(&mut self, mut value: u64) {
        while value & !0x7F != 0 {
            if self.window.remaining() == 0 {
                if !self.window.advance() {
                    return;
                }
            } else {
                self.window.put((value & 0x7F) as u8 | 0x80);
                value >>= 7;
            }
        }

        while self.window.remaining() == 0 {
            if !self.window.advance() {
                return;
            }
        }
        self.window.put(value as u8);
    }
}

impl std::fmt::Debug for WriteCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteCursor")
            .field("position", &self.position())
            .field("remaining", &self.remaining())
            .finish()
    }
}
