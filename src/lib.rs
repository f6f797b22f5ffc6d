//! # AtlasPage
//!
//! A paged, growable byte store for delta-compressed adjacency records:
//! - Lock-free bump allocation of disjoint regions from many threads
//! - Length-prefixed, delta-encoded LEB128 records
//! - Reusable read cursors shared between threads through a pool
//! - Transparent handling of values that straddle page boundaries
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ByteStore                             │
//! │        allocate / skip / read_cursor_at / release            │
//! └──────┬──────────────────────┬───────────────────────┬───────┘
//!        │                      │                       │
//!        ▼                      ▼                       ▼
//! ┌─────────────┐      ┌─────────────────┐      ┌─────────────┐
//! │    Bump     │      │     Cursors     │      │ CursorPool  │
//! │  Allocator  │      │ Write  /  Read  │◄─────│ (ArrayQueue)│
//! │ (AtomicU64) │      │   PageWindow    │      └─────────────┘
//! └─────────────┘      └────────┬────────┘
//!                               │
//!                               ▼
//!                      ┌─────────────────┐
//!                      │    PageTable    │
//!                      │ RwLock<Vec<Arc  │
//!                      │     <Page>>>    │
//!                      └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod page;
pub mod allocator;
pub mod pool;
pub mod codec;
pub mod cursor;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AtlasError, Result};
pub use config::Config;
pub use cursor::{ReadCursor, WriteCursor};
pub use store::{ByteStore, RecordReader};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AtlasPage
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
