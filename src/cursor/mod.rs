//! Cursor Module
//!
//! Page-boundary-transparent sequential access to the byte store.
//!
//! ## Layout
//! ```text
//!            ┌──────────────┐
//!            │  PageWindow  │  first/last page, active page, [offset, limit)
//!            └──────┬───────┘
//!          ┌────────┴────────┐
//!          ▼                 ▼
//!   ┌─────────────┐   ┌─────────────┐
//!   │ WriteCursor │   │ ReadCursor  │
//!   │ fixed32     │   │ count       │
//!   │ varint      │   │ delta varint│
//!   └─────────────┘   └─────────────┘
//! ```
//!
//! Every encoder and decoder has a fast path for values that fit in the
//! current window and a slow path that moves to the next page mid-value.
//! Cursors are single-owner; they move between threads only through the
//! store's cursor pool.

mod reader;
mod window;
mod writer;

pub use reader::ReadCursor;
pub use writer::WriteCursor;
