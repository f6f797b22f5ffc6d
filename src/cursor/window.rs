//! Page-window tracker
//!
//! Walks the pages touched by a logical range `[from, from + length)` and
//! exposes the active page plus the valid `[offset, limit)` window inside it.

use std::sync::Arc;

use crate::page::{Page, PageTable};

/// Shared positioning state of read and write cursors
pub(crate) struct PageWindow {
    table: Arc<PageTable>,

    /// Page currently being read or written; `None` before the first advance
    /// and after exhaustion
    page: Option<Arc<Page>>,
    /// Next byte to touch inside `page`
    offset: usize,
    /// One past the last valid byte inside `page`
    limit: usize,

    from: u64,
    length: u64,
    from_page: usize,
    to_page: usize,
    /// Page loaded by the next call to `advance`
    next_page: usize,
}

impl PageWindow {
    pub(crate) fn new(table: Arc<PageTable>) -> Self {
        Self {
            table,
            page: None,
            offset: 0,
            limit: 0,
            from: 0,
            length: 0,
            from_page: 0,
            to_page: 0,
            // Nothing to advance into until `init`
            next_page: 1,
        }
    }

    pub(crate) fn table(&self) -> &Arc<PageTable> {
        &self.table
    }

    /// Target `[from, from + length)`; no page is loaded until `advance`
    pub(crate) fn init(&mut self, from: u64, length: u64) {
        let geometry = self.table.geometry();
        self.clear();
        self.from = from;
        self.length = length;
        self.from_page = geometry.page_index(from);
        if length == 0 {
            self.to_page = self.from_page;
            self.next_page = self.from_page + 1;
        } else {
            self.to_page = geometry.page_index(from + length - 1);
            self.next_page = self.from_page;
        }
    }

    /// Move to the next page of the range
    ///
    /// Returns `false` once the range is used up, or when the page table no
    /// longer holds the page (released store).
    pub(crate) fn advance(&mut self) -> bool {
        if self.next_page > self.to_page {
            self.clear();
            return false;
        }

        let current = self.next_page;
        let page = match self.table.page(current) {
            Some(page) => page,
            None => {
                self.clear();
                self.next_page = self.to_page + 1;
                return false;
            }
        };
        self.next_page += 1;

        let geometry = self.table.geometry();
        let page_size = page.len();
        if current == self.from_page {
            self.offset = geometry.index_in_page(self.from);
            let available = (page_size - self.offset) as u64;
            self.limit = self.offset + available.min(self.length) as usize;
        } else if current < self.to_page {
            self.offset = 0;
            self.limit = page_size;
        } else {
            self.offset = 0;
            self.limit = geometry.index_in_page(self.from + self.length - 1) + 1;
        }
        self.page = Some(page);
        true
    }

    /// Drop the page handle and empty the window
    pub(crate) fn clear(&mut self) {
        self.page = None;
        self.offset = 0;
        self.limit = 0;
    }

    /// Bytes left in the active window
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.limit - self.offset
    }

    /// Logical offset of the next byte, `None` when no page is loaded
    pub(crate) fn position(&self) -> Option<u64> {
        self.page.as_ref()?;
        let page_start = self.table.geometry().capacity_for(self.next_page - 1);
        Some(page_start + self.offset as u64)
    }

    #[inline]
    pub(crate) fn put(&mut self, byte: u8) {
        debug_assert!(self.offset < self.limit);
        if let Some(page) = &self.page {
            page.set(self.offset, byte);
            self.offset += 1;
        }
    }

    /// Write as much of `bytes` as fits in the window
    #[inline]
    pub(crate) fn put_slice(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(self.remaining());
        if let Some(page) = &self.page {
            for (i, &byte) in bytes[..n].iter().enumerate() {
                page.set(self.offset + i, byte);
            }
            self.offset += n;
        }
    }

    #[inline]
    pub(crate) fn take(&mut self) -> u8 {
        debug_assert!(self.offset < self.limit);
        match &self.page {
            Some(page) => {
                let byte = page.get(self.offset);
                self.offset += 1;
                byte
            }
            None => 0,
        }
    }

    /// Fill `dst` from the window; caller checks `remaining() >= dst.len()`
    #[inline]
    pub(crate) fn take_slice(&mut self, dst: &mut [u8]) {
        debug_assert!(dst.len() <= self.remaining());
        if let Some(page) = &self.page {
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = page.get(self.offset + i);
            }
            self.offset += dst.len();
        }
    }
}
