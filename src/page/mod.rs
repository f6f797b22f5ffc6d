//! Page Module
//!
//! Fixed-size byte pages and the growable table that owns them.
//!
//! ## Responsibilities
//! - Map logical byte offsets to (page, offset-in-page) pairs
//! - Append pages on demand (`grow`)
//! - Publish new pages safely to concurrently running threads
//!
//! ## Addressing
//! ```text
//!  logical offset i
//!  ┌───────────────────────────┬──────────────────────┐
//!  │ page_index = i >> shift   │ in_page = i & mask   │
//!  └───────────────────────────┴──────────────────────┘
//!
//!  pages: [ page 0 ][ page 1 ][ page 2 ] ...   (each page_size bytes)
//! ```
//!
//! Pages never move once appended; cursors keep `Arc<Page>` handles to the
//! page they are positioned on.

mod table;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

pub use table::PageTable;

// =============================================================================
// Page Geometry
// =============================================================================

/// Page size and the shift/mask derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    page_size: usize,
    page_shift: u32,
    page_mask: u64,
}

impl PageGeometry {
    /// Create geometry for a power-of-two page size
    pub fn new(page_size: usize) -> Self {
        debug_assert!(page_size.is_power_of_two());
        Self {
            page_size,
            page_shift: page_size.trailing_zeros(),
            page_mask: page_size as u64 - 1,
        }
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the page holding logical offset `index`
    #[inline]
    pub fn page_index(&self, index: u64) -> usize {
        (index >> self.page_shift) as usize
    }

    /// Position of logical offset `index` inside its page
    #[inline]
    pub fn index_in_page(&self, index: u64) -> usize {
        (index & self.page_mask) as usize
    }

    /// Number of pages needed to address `size` bytes
    pub fn pages_for(&self, size: u64) -> u64 {
        if size == 0 {
            0
        } else {
            ((size - 1) >> self.page_shift) + 1
        }
    }

    /// Bytes addressable by `pages` pages
    pub fn capacity_for(&self, pages: usize) -> u64 {
        (pages as u64) << self.page_shift
    }
}

// =============================================================================
// Page
// =============================================================================

/// A fixed-size byte buffer
///
/// Bytes are atomics so that threads holding disjoint allocation regions can
/// write into the same page without a data race. All accesses are `Relaxed`;
/// ordering between a writer phase and a reader phase is the caller's job.
pub struct Page {
    bytes: Box<[AtomicU8]>,
}

impl Page {
    /// Allocate a zeroed page
    pub fn new(size: usize) -> Self {
        Self {
            bytes: (0..size).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.bytes[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, index: usize, value: u8) {
        self.bytes[index].store(value, Ordering::Relaxed);
    }

    /// Store `value` and return the byte it replaced
    #[inline]
    pub fn replace(&self, index: usize, value: u8) -> u8 {
        self.bytes[index].swap(value, Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page").field("len", &self.len()).finish()
    }
}
