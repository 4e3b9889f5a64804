//! Backend provider implementations.
//!
//! Each provider implements the `Backend` trait.
//!
//! # Available Providers
//!
//! - [`MemoryBackend`]: In-memory store using moka, size-bounded with optional TTL
//! - [`InstrumentedBackend`]: Decorator counting round trips to any backend

mod instrumented;
mod memory;

pub use instrumented::{InstrumentedBackend, RoundTrips};
pub use memory::MemoryBackend;
