//! Page Table Tests
//!
//! Tests verify:
//! - Page geometry (page index / offset in page)
//! - Growth on demand and capacity publication
//! - Concurrent growth
//! - Release semantics

use std::sync::Arc;
use std::thread;

use atlaspage::page::{Page, PageGeometry, PageTable};
use atlaspage::AtlasError;

// =============================================================================
// Geometry Tests
// =============================================================================

#[test]
fn test_geometry_addressing() {
    let geometry = PageGeometry::new(16);

    assert_eq!(geometry.page_size(), 16);
    assert_eq!(geometry.page_index(0), 0);
    assert_eq!(geometry.page_index(15), 0);
    assert_eq!(geometry.page_index(16), 1);
    assert_eq!(geometry.page_index(47), 2);
    assert_eq!(geometry.index_in_page(0), 0);
    assert_eq!(geometry.index_in_page(15), 15);
    assert_eq!(geometry.index_in_page(16), 0);
    assert_eq!(geometry.index_in_page(47), 15);
}

#[test]
fn test_geometry_pages_for() {
    let geometry = PageGeometry::new(8);

    assert_eq!(geometry.pages_for(0), 0);
    assert_eq!(geometry.pages_for(1), 1);
    assert_eq!(geometry.pages_for(8), 1);
    assert_eq!(geometry.pages_for(9), 2);
    assert_eq!(geometry.capacity_for(3), 24);
}

// =============================================================================
// Page Tests
// =============================================================================

#[test]
fn test_page_is_zeroed() {
    let page = Page::new(32);
    assert_eq!(page.len(), 32);
    assert!((0..32).all(|i| page.get(i) == 0));
}

#[test]
fn test_page_replace_returns_previous() {
    let page = Page::new(8);
    page.set(3, 7);
    assert_eq!(page.replace(3, 9), 7);
    assert_eq!(page.get(3), 9);
}

// =============================================================================
// Growth Tests
// =============================================================================

#[test]
fn test_new_table_covers_initial_size() {
    let table = PageTable::new(PageGeometry::new(16), 33).unwrap();

    assert_eq!(table.page_count(), 3);
    assert_eq!(table.capacity(), 48);
}

#[test]
fn test_empty_table() {
    let table = PageTable::new(PageGeometry::new(16), 0).unwrap();

    assert_eq!(table.page_count(), 0);
    assert_eq!(table.capacity(), 0);
    assert!(table.page(0).is_none());
}

#[test]
fn test_grow_appends_pages() {
    let table = PageTable::new(PageGeometry::new(16), 16).unwrap();

    table.grow(17).unwrap();
    assert_eq!(table.page_count(), 2);
    assert_eq!(table.capacity(), 32);

    // Already large enough
    table.grow(20).unwrap();
    assert_eq!(table.page_count(), 2);
}

#[test]
fn test_grow_keeps_existing_pages() {
    let table = PageTable::new(PageGeometry::new(16), 16).unwrap();
    let first = table.page(0).unwrap();
    first.set(5, 42);

    table.grow(1024).unwrap();

    let again = table.page(0).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(again.get(5), 42);
}

#[test]
fn test_page_pair() {
    let table = PageTable::new(PageGeometry::new(8), 16).unwrap();

    let (a, b) = table.page_pair(0);
    assert!(a.is_some());
    assert!(b.is_some());

    let (a, b) = table.page_pair(1);
    assert!(a.is_some());
    assert!(b.is_none());
}

#[test]
fn test_grow_overflow() {
    let table = PageTable::new(PageGeometry::new(1 << 20), 0).unwrap();

    let result = table.grow(u64::MAX);
    assert!(matches!(result, Err(AtlasError::CapacityOverflow { .. })));
}

#[test]
fn test_concurrent_grow() {
    let table = Arc::new(PageTable::new(PageGeometry::new(64), 0).unwrap());

    let mut handles = vec![];
    for t in 0..8u64 {
        let table = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            for i in 0..50u64 {
                let want = (t * 50 + i) * 64 + 1;
                table.grow(want).unwrap();
                // Every page below the observed capacity is reachable
                let capacity = table.capacity();
                assert!(capacity >= want);
                assert!(table.page(table.page_of(capacity - 1)).is_some());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(table.page_count(), 8 * 50);
}

// =============================================================================
// Release Tests
// =============================================================================

#[test]
fn test_release_drops_pages() {
    let table = PageTable::new(PageGeometry::new(16), 64).unwrap();

    assert_eq!(table.release(), Some(4));
    assert!(table.is_released());
    assert_eq!(table.capacity(), 0);
    assert_eq!(table.page_count(), 0);
    assert!(table.page(0).is_none());
}

#[test]
fn test_release_is_one_shot() {
    let table = PageTable::new(PageGeometry::new(16), 64).unwrap();

    assert!(table.release().is_some());
    assert!(table.release().is_none());
}

#[test]
fn test_grow_after_release_fails() {
    let table = PageTable::new(PageGeometry::new(16), 16).unwrap();
    table.release();

    assert!(matches!(table.grow(32), Err(AtlasError::Released)));
}

#[test]
fn test_held_page_outlives_release() {
    let table = PageTable::new(PageGeometry::new(16), 16).unwrap();
    let page = table.page(0).unwrap();
    page.set(0, 1);

    table.release();

    assert_eq!(page.get(0), 1);
}
