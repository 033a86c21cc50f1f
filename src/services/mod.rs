//! Service layer: the staff-facing guard rules in front of the store.
//!
//! The store applies mutations blindly; everything a human could get wrong
//! (calling to an occupied bay, mixing vehicle classes, re-queueing a raw
//! material truck) is checked here and reported as a typed error the HTTP
//! layer can map to a response.

pub mod dispatch;

pub use dispatch::{DispatchError, DispatchResult};
