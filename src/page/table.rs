//! Page table implementation
//!
//! Vec of shared pages behind a RwLock, with an atomically published capacity.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{AtlasError, Result};

use super::{Page, PageGeometry};

/// Growable, ordered sequence of fixed-size pages
///
/// ## Concurrency:
/// - `pages`: RwLock; `grow` appends under the write lock, lookups take the
///   read lock and clone the `Arc<Page>`
/// - `capacity`: written with `Release` after the new pages are in place and
///   read with `Acquire`, so a thread that observes capacity `c` can fetch
///   every page covering `[0, c)`
/// - Byte contents are not fenced here
pub struct PageTable {
    geometry: PageGeometry,

    /// Pages in logical order; never reordered or shrunk except by `release`
    pages: RwLock<Vec<Arc<Page>>>,

    /// Addressable bytes: page_count * page_size
    capacity: AtomicU64,

    /// Set once by `release`; blocks further growth
    released: AtomicBool,
}

impl PageTable {
    /// Create a table with enough pages to address `initial_size` bytes
    pub fn new(geometry: PageGeometry, initial_size: u64) -> Result<Self> {
        let table = Self {
            geometry,
            pages: RwLock::new(Vec::new()),
            capacity: AtomicU64::new(0),
            released: AtomicBool::new(false),
        };
        table.grow(initial_size)?;
        Ok(table)
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn page_size(&self) -> usize {
        self.geometry.page_size()
    }

    /// Addressable bytes
    pub fn capacity(&self) -> u64 {
        self.capacity.load(Ordering::Acquire)
    }

    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }

    #[inline]
    pub fn page_of(&self, index: u64) -> usize {
        self.geometry.page_index(index)
    }

    #[inline]
    pub fn offset_in_page(&self, index: u64) -> usize {
        self.geometry.index_in_page(index)
    }

    /// Shared handle to page `page_index`, if it exists
    pub fn page(&self, page_index: usize) -> Option<Arc<Page>> {
        self.pages.read().get(page_index).cloned()
    }

    /// Handles to two consecutive pages under a single read lock
    pub fn page_pair(&self, page_index: usize) -> (Option<Arc<Page>>, Option<Arc<Page>>) {
        let pages = self.pages.read();
        (
            pages.get(page_index).cloned(),
            pages.get(page_index + 1).cloned(),
        )
    }

    /// Append pages until `min_capacity` bytes are addressable
    ///
    /// Cheap when the capacity is already sufficient (one atomic load).
    pub fn grow(&self, min_capacity: u64) -> Result<()> {
        if self.capacity() >= min_capacity {
            return Ok(());
        }

        let needed = self.geometry.pages_for(min_capacity);
        let needed = usize::try_from(needed).map_err(|_| AtlasError::CapacityOverflow {
            requested: min_capacity,
        })?;
        if needed.checked_mul(self.page_size()).is_none() {
            return Err(AtlasError::CapacityOverflow {
                requested: min_capacity,
            });
        }

        let mut pages = self.pages.write();
        if self.released.load(Ordering::Acquire) {
            return Err(AtlasError::Released);
        }
        // Another thread may have grown the table while we waited
        if pages.len() >= needed {
            return Ok(());
        }

        let before = pages.len();
        pages.reserve(needed - before);
        while pages.len() < needed {
            pages.push(Arc::new(Page::new(self.page_size())));
        }
        self.capacity
            .store(self.geometry.capacity_for(pages.len()), Ordering::Release);

        tracing::debug!(
            from_pages = before,
            to_pages = pages.len(),
            capacity = self.geometry.capacity_for(pages.len()),
            "grew page table"
        );
        Ok(())
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Drop every page reference and refuse further growth
    ///
    /// Returns the number of pages dropped, or `None` if already released.
    /// Cursors still holding a page keep that page alive until they let go.
    pub fn release(&self) -> Option<usize> {
        let mut pages = self.pages.write();
        if self.released.swap(true, Ordering::AcqRel) {
            return None;
        }
        let dropped = pages.len();
        pages.clear();
        pages.shrink_to_fit();
        self.capacity.store(0, Ordering::Release);
        Some(dropped)
    }
}

impl std::fmt::Debug for PageTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTable")
            .field("page_size", &self.page_size())
            .field("capacity", &self.capacity())
            .field("released", &self.is_released())
            .finish()
    }
}
