//! Write Cursor Tests
//!
//! Tests verify:
//! - Fixed32 encoding at every in-page offset (0/1/2/3-byte splits)
//! - Varint encoding across page boundaries matches the contiguous codec
//! - Writes stop silently at the end of the region
//! - Regions past the current capacity grow the page table

use atlaspage::codec::{put_varint, varint_len};
use atlaspage::{AtlasError, ByteStore, Config};

// =============================================================================
// Helper Functions
// =============================================================================

const FIXED32_PATTERNS: [u32; 5] = [0, u32::MAX, 0x0102_0304, 0xDEAD_BEEF, 0x8000_0001];

const VARINT_VALUES: [u64; 8] = [
    0,
    127,
    128,
    16_383,
    16_384,
    999_985,
    i64::MAX as u64,
    u64::MAX,
];

fn tiny_store(page_size: usize) -> ByteStore {
    let config = Config::builder().page_size(page_size).build();
    ByteStore::with_config(config).unwrap()
}

// =============================================================================
// Fixed32 Tests
// =============================================================================

#[test]
fn test_fixed32_every_offset() {
    for start in 0..24u64 {
        for &value in &FIXED32_PATTERNS {
            let store = tiny_store(8);
            store.skip(start);

            let (offset, mut cursor) = store.allocate(4).unwrap();
            assert_eq!(offset, start);
            cursor.add_fixed32(value);

            assert_eq!(
                store.get_fixed32(start).unwrap(),
                Some(value),
                "value {:#x} at offset {}",
                value,
                start
            );
        }
    }
}

#[test]
fn test_fixed32_is_big_endian() {
    let store = tiny_store(8);
    store.skip(6);

    let (_, mut cursor) = store.allocate(4).unwrap();
    cursor.add_fixed32(0x0A0B_0C0D);

    assert_eq!(&store.read_range(6, 4).unwrap()[..], &[0x0A, 0x0B, 0x0C, 0x0D]);
    // Split two bytes on page 0, two on page 1
    assert_eq!(store.get_byte(7).unwrap(), 0x0B);
    assert_eq!(store.get_byte(8).unwrap(), 0x0C);
}

#[test]
fn test_consecutive_fixed32_across_pages() {
    let store = tiny_store(8);
    store.skip(1);

    let (start, mut cursor) = store.allocate(4 * 10).unwrap();
    for i in 0..10u32 {
        cursor.add_fixed32(i * 0x0101_0101);
    }

    for i in 0..10u32 {
        let value = store.get_fixed32(start + 4 * i as u64).unwrap();
        assert_eq!(value, Some(i * 0x0101_0101));
    }
}

// =============================================================================
// Varint Tests
// =============================================================================

#[test]
fn test_varint_every_offset_matches_codec() {
    for start in 0..24u64 {
        for &value in &VARINT_VALUES {
            let store = tiny_store(8);
            store.skip(start);

            let len = varint_len(value) as u64;
            let (offset, mut cursor) = store.allocate(len).unwrap();
            cursor.add_varint(value);

            let mut expected = Vec::new();
            put_varint(&mut expected, value);
            assert_eq!(
                &store.read_range(offset, len).unwrap()[..],
                &expected[..],
                "value {} at offset {}",
                value,
                start
            );
        }
    }
}

#[test]
fn test_varint_fast_path_with_large_page() {
    let store = ByteStore::create(0).unwrap();

    let (offset, mut cursor) = store.allocate(16).unwrap();
    assert_eq!(cursor.remaining(), 16);
    cursor.add_varint(999_985);

    assert_eq!(&store.read_range(offset, 3).unwrap()[..], &[0xB1, 0x84, 0x3D]);
    assert_eq!(cursor.remaining(), 13);
}

// =============================================================================
// Region Boundary Tests
// =============================================================================

#[test]
fn test_write_stops_at_region_end() {
    let store = tiny_store(8);

    let (_, mut cursor) = store.allocate(3).unwrap();
    cursor.add_fixed32(0x0102_0304);

    // Only the bytes inside the region are written
    assert_eq!(&store.read_range(0, 4).unwrap()[..], &[0x01, 0x02, 0x03, 0x00]);
}

#[test]
fn test_varint_stops_at_region_end() {
    let store = tiny_store(16);
    store.skip(7);

    let (_, mut cursor) = store.allocate(2).unwrap();
    cursor.add_varint(1 << 21);

    assert_eq!(&store.read_range(7, 3).unwrap()[..], &[0x80, 0x80, 0x00]);
}

#[test]
fn test_position_and_remaining() {
    let store = tiny_store(8);
    store.skip(5);

    let (_, mut cursor) = store.allocate(10).unwrap();
    assert_eq!(cursor.position(), Some(5));
    assert_eq!(cursor.remaining(), 3);

    cursor.add_fixed32(7);
    assert_eq!(cursor.position(), Some(9));
    assert_eq!(cursor.remaining(), 6);
}

#[test]
fn test_allocate_grows_capacity() {
    let store = tiny_store(8);
    assert_eq!(store.capacity(), 0);

    let (start, mut cursor) = store.allocate(20).unwrap();
    assert_eq!(start, 0);
    assert_eq!(store.capacity(), 24);
    assert_eq!(store.page_count(), 3);

    for _ in 0..5 {
        cursor.add_fixed32(u32::MAX);
    }
    assert!((0..20).all(|i| store.get_byte(i).unwrap() == 0xFF));
}

#[test]
fn test_zero_length_allocation() {
    let store = tiny_store(8);

    let (start, mut cursor) = store.allocate(0).unwrap();
    assert_eq!(start, 0);
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(cursor.position(), None);

    // Nothing to write into
    cursor.add_varint(5);
    cursor.add_fixed32(5);
    assert_eq!(store.allocated(), 0);
}

#[test]
fn test_allocate_into_reuses_cursor() {
    let store = tiny_store(8);
    let mut cursor = store.new_write_cursor();

    let a = store.allocate_into(4, &mut cursor).unwrap();
    cursor.add_fixed32(1);
    let b = store.allocate_into(4, &mut cursor).unwrap();
    cursor.add_fixed32(2);

    assert_eq!((a, b), (0, 4));
    assert_eq!(store.get_fixed32(0).unwrap(), Some(1));
    assert_eq!(store.get_fixed32(4).unwrap(), Some(2));
}

#[test]
fn test_allocate_into_rejects_foreign_cursor() {
    let store = tiny_store(8);
    let other = tiny_store(8);
    let mut cursor = other.new_write_cursor();

    let result = store.allocate_into(4, &mut cursor);
    assert!(matches!(result, Err(AtlasError::ForeignCursor)));
}
