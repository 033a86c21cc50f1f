//! HTTP server module for the dock queue backend.
//!
//! This module exposes the store and its collaborators as a REST API plus
//! an SSE event feed. Every browser-facing view (registration kiosk, staff
//! console, display board, report page) talks to exactly this surface; none
//! of them touch persistence or the sync bus directly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing, JSON serialization                    │
//! │  - CORS, compression, error mapping                       │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Guard Layer (services::dispatch)                         │
//! │  - Bay/class/status validation for staff actions          │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Shared Store (store::DockStore)                          │
//! │  - Queue/bay state, snapshots, sync bus broadcast         │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
