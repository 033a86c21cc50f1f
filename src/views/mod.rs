//! Read-only view models over the store's state.
//!
//! Pure transforms: the display board and the entry/exit report each take a
//! state snapshot and shape it for rendering. Nothing in here mutates the
//! store except the report export, which archives the rows it hands out.

pub mod board;
pub mod report;
