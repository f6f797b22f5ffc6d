//! Byte Store
//!
//! Public facade over the page table, bump allocator, and read-cursor pool.
//!
//! ## Responsibilities
//! - Raw positional access (`get_byte`, `get_fixed32`, `set_byte`)
//! - Region allocation with a write cursor positioned on the region
//! - Pooled read cursors for decoding records
//! - One-shot teardown
//!
//! ## Typical Flow
//! ```text
//! write phase (many threads)          read phase (many threads)
//! ──────────────────────────          ─────────────────────────
//! allocate(n) ─► WriteCursor          read_cursor_at(offset) ─► ReadCursor
//!   add_fixed32(count)                  for value in cursor { .. }
//!   add_varint(delta) ...             return_read_cursor(cursor)
//! ```
//!
//! The store does not fence the two phases: callers make sure every writer of
//! a region has finished (thread join, barrier, channel) before a reader is
//! positioned on it.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::allocator::BumpAllocator;
use crate::codec;
use crate::config::Config;
use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{AtlasError, Result};
use crate::page::{Page, PageGeometry, PageTable};
use crate::pool::CursorPool;

/// Paged, growable byte store for delta-compressed records
///
/// ## Concurrency:
/// - `allocate`/`skip`: one atomic `fetch_add`, lock-free
/// - Page growth: serialized by the page table's write lock, published with
///   release/acquire on the capacity
/// - Byte contents: threads write disjoint regions; no locking
/// - Read cursors: handed between threads by the pool
/// - `release`: must not overlap any other use of the store
pub struct ByteStore {
    config: Config,
    table: Arc<PageTable>,
    allocator: BumpAllocator,
    cursors: CursorPool<ReadCursor>,
}

impl ByteStore {
    /// Create a store with default settings and `size` bytes addressable
    pub fn create(size: u64) -> Result<Self> {
        Self::with_config(Config::builder().initial_size(size).build())
    }

    /// Create a store from an explicit configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let geometry = PageGeometry::new(config.page_size);
        let table = Arc::new(PageTable::new(geometry, config.initial_size)?);

        let pool_table = Arc::clone(&table);
        let cursors = CursorPool::new(config.pool_capacity, move || {
            ReadCursor::new(Arc::clone(&pool_table))
        });

        tracing::info!(
            page_size = config.page_size,
            initial_size = config.initial_size,
            pages = table.page_count(),
            "created byte store"
        );

        Ok(Self {
            config,
            table,
            allocator: BumpAllocator::new(),
            cursors,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Geometry & Stats
    // =========================================================================

    /// Addressable bytes
    pub fn capacity(&self) -> u64 {
        self.table.capacity()
    }

    pub fn page_size(&self) -> usize {
        self.table.page_size()
    }

    pub fn page_count(&self) -> usize {
        self.table.page_count()
    }

    /// Bytes handed out by `allocate` and `skip` so far
    pub fn allocated(&self) -> u64 {
        self.allocator.allocated()
    }

    /// Bytes held by pages
    pub fn memory_usage(&self) -> u64 {
        self.table.geometry().capacity_for(self.page_count())
    }

    /// Idle read cursors parked in the pool
    pub fn pooled_cursors(&self) -> usize {
        self.cursors.idle()
    }

    pub fn is_released(&self) -> bool {
        self.table.is_released()
    }

    // =========================================================================
    // Positional Access
    // =========================================================================

    /// Read the byte at `index`
    pub fn get_byte(&self, index: u64) -> Result<u8> {
        let (page, in_page) = self.locate(index)?;
        Ok(page.get(in_page))
    }

    /// Read a big-endian `u32` starting at `index`
    ///
    /// Returns `Ok(None)` when the value would continue into a page that
    /// does not exist.
    pub fn get_fixed32(&self, index: u64) -> Result<Option<u32>> {
        self.check_index(index)?;
        let in_page = self.table.offset_in_page(index);
        let (page, next) = self.table.page_pair(self.table.page_of(index));
        let page = page.ok_or_else(|| self.out_of_bounds(index))?;

        let head = page.len() - in_page;
        let mut bytes = [0u8; 4];
        if head >= 4 {
            for (i, byte) in bytes.iter_mut().enumerate() {
                *byte = page.get(in_page + i);
            }
            return Ok(Some(u32::from_be_bytes(bytes)));
        }

        let next = match next {
            Some(next) => next,
            None => return Ok(None),
        };
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = if i < head {
                page.get(in_page + i)
            } else {
                next.get(i - head)
            };
        }
        Ok(Some(u32::from_be_bytes(bytes)))
    }

    /// Overwrite the byte at `index`, returning the previous value
    pub fn set_byte(&self, index: u64, value: u8) -> Result<u8> {
        let (page, in_page) = self.locate(index)?;
        Ok(page.replace(in_page, value))
    }

    /// Copy `len` bytes starting at `offset` out of the store
    pub fn read_range(&self, offset: u64, len: u64) -> Result<Bytes> {
        if self.is_released() {
            return Err(AtlasError::Released);
        }
        let capacity = self.capacity();
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= capacity)
            .ok_or(AtlasError::IndexOutOfBounds {
                index: offset.saturating_add(len),
                capacity,
            })?;

        let mut out = BytesMut::with_capacity(len as usize);
        let mut index = offset;
        while index < end {
            let (page, in_page) = self.locate(index)?;
            let chunk = ((page.len() - in_page) as u64).min(end - index) as usize;
            for i in in_page..in_page + chunk {
                out.put_u8(page.get(i));
            }
            index += chunk as u64;
        }
        Ok(out.freeze())
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Reserve `len` bytes and return the start offset with a write cursor
    /// positioned on the region
    pub fn allocate(&self, len: u64) -> Result<(u64, WriteCursor)> {
        let mut cursor = self.new_write_cursor();
        let start = self.allocate_into(len, &mut cursor)?;
        Ok((start, cursor))
    }

    /// Reserve `len` bytes and reposition `cursor` onto the region
    ///
    /// Lets a thread reuse one write cursor across many allocations.
    pub fn allocate_into(&self, len: u64, cursor: &mut WriteCursor) -> Result<u64> {
        if self.is_released() {
            return Err(AtlasError::Released);
        }
        if !cursor.belongs_to(&self.table) {
            return Err(AtlasError::ForeignCursor);
        }

        let start = self.allocator.allocate(len);
        cursor.init(start, len)?;
        tracing::trace!(start, len, "allocated region");
        Ok(start)
    }

    /// Reserve `len` bytes that no writer will touch
    pub fn skip(&self, len: u64) {
        self.allocator.skip(len);
        tracing::trace!(len, "skipped region");
    }

    /// A write cursor not yet positioned on any region
    pub fn new_write_cursor(&self) -> WriteCursor {
        WriteCursor::new(Arc::clone(&self.table))
    }

    /// Allocate and encode a record holding `targets`
    ///
    /// `targets` must be non-decreasing. Returns the record's start offset.
    pub fn write_record(&self, targets: &[u64]) -> Result<u64> {
        let len = codec::record_len(targets)?;
        let (start, mut cursor) = self.allocate(len)?;

        cursor.add_fixed32(targets.len() as u32);
        let mut previous = 0u64;
        for &target in targets {
            cursor.add_varint(target - previous);
            previous = target;
        }
        Ok(start)
    }

    // =========================================================================
    // Read Cursors
    // =========================================================================

    /// Take a cursor from the pool, positioned on the record at `offset`
    ///
    /// Hand it back with [`ByteStore::return_read_cursor`].
    pub fn read_cursor_at(&self, offset: u64) -> Result<ReadCursor> {
        let mut cursor = self.cursors.acquire();
        if let Err(e) = cursor.init(offset) {
            self.return_read_cursor(cursor);
            return Err(e);
        }
        Ok(cursor)
    }

    /// Park a read cursor for reuse by any thread
    ///
    /// Cursors taken from another store are dropped rather than pooled.
    pub fn return_read_cursor(&self, mut cursor: ReadCursor) {
        if self.is_released() {
            return;
        }
        if !cursor.belongs_to(&self.table) {
            tracing::warn!("dropping read cursor returned to a foreign store");
            return;
        }
        cursor.clear();
        self.cursors.release(cursor);
    }

    /// Pooled cursor on the record at `offset`, returned to the pool on drop
    pub fn read_record(&self, offset: u64) -> Result<RecordReader<'_>> {
        let cursor = self.read_cursor_at(offset)?;
        Ok(RecordReader {
            store: self,
            cursor: Some(cursor),
        })
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Drain the cursor pool and drop every page
    ///
    /// One-shot: a second call fails with `Released`, as do all later
    /// operations. Must not run while another thread is using the store.
    pub fn release(&self) -> Result<()> {
        let pages = self.table.release().ok_or(AtlasError::Released)?;
        let cursors = self.cursors.drain();
        tracing::info!(
            pages,
            cursors,
            freed_bytes = self.table.geometry().capacity_for(pages),
            "released byte store"
        );
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn check_index(&self, index: u64) -> Result<()> {
        if self.is_released() {
            return Err(AtlasError::Released);
        }
        if index >= self.capacity() {
            return Err(self.out_of_bounds(index));
        }
        Ok(())
    }

    fn locate(&self, index: u64) -> Result<(Arc<Page>, usize)> {
        self.check_index(index)?;
        let page = self
            .table
            .page(self.table.page_of(index))
            .ok_or_else(|| self.out_of_bounds(index))?;
        Ok((page, self.table.offset_in_page(index)))
    }

    fn out_of_bounds(&self, index: u64) -> AtlasError {
        AtlasError::IndexOutOfBounds {
            index,
            capacity: self.capacity(),
        }
    }
}

impl std::fmt::Debug for ByteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStore")
            .field("table", &self.table)
            .field("allocated", &self.allocated())
            .field("cursors", &self.cursors)
            .finish()
    }
}

// =============================================================================
// Record Reader
// =============================================================================

/// Read cursor borrowed from a store's pool, handed back on drop
pub struct RecordReader<'a> {
    store: &'a ByteStore,
    /// Taken back by `drop`
    cursor: Option<ReadCursor>,
}

impl RecordReader<'_> {
    /// Number of values in the record
    pub fn len(&self) -> usize {
        self.cursor.as_ref().map_or(0, ReadCursor::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values not yet returned
    pub fn remaining(&self) -> usize {
        self.cursor.as_ref().map_or(0, ReadCursor::remaining)
    }
}

impl Iterator for RecordReader<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.cursor.as_mut()?.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl Drop for RecordReader<'_> {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            self.store.return_read_cursor(cursor);
        }
    }
}
