//! I/O utilities for payload streams.
//!
//! This module provides the forward-only stream contract shared by the outer
//! decompressor and the inner walker.

pub mod forward;

// Re-export main types for convenience
pub use forward::ForwardStream;
pub use forward::MemoryStream;
