//! Common types shared by every part of the cache core.
//!
//! This module provides:
//! 1. **Access Kinds:** Loads and stores as seen by a cache line.
//! 2. **Identifiers:** Core ids and memory components.
//! 3. **Error Handling:** The configuration error type.

/// Memory access kinds and hierarchy components.
pub mod data;

/// Error types.
pub mod error;

pub use data::{AccessKind, CoreId, MemComponent};
pub use error::CacheError;
