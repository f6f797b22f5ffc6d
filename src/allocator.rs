//! Bump Allocator
//!
//! Hands out disjoint byte regions from a single monotonically increasing
//! counter.
//!
//! ## Responsibilities
//! - `allocate(n)`: reserve `[start, start + n)` and return `start`
//! - `skip(n)`: reserve and discard a region (padding, placeholders)
//!
//! ## Guarantees
//! - One `fetch_add` per call: no locks, no retries, no blocking
//! - Concurrently issued regions never overlap; sorted by start they tile
//!   `[0, allocated())` exactly
//! - Regions are never reused or individually freed
//! - Order of grants across threads is unspecified

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free bump allocator over the logical byte space
#[derive(Debug, Default)]
pub struct BumpAllocator {
    next: AtomicU64,
}

impl BumpAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `len` bytes and return the start offset of the region
    #[inline]
    pub fn allocate(&self, len: u64) -> u64 {
        // The counter only orders regions; page visibility is the page table's job
        self.next.fetch_add(len, Ordering::Relaxed)
    }

    /// Reserve `len` bytes that will never be handed to a writer
    #[inline]
    pub fn skip(&self, len: u64) {
        self.next.fetch_add(len, Ordering::Relaxed);
    }

    /// Total bytes handed out so far (allocated + skipped)
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
