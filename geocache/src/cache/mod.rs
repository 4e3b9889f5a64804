//! Key-value backend layer.
//!
//! Strategies talk to storage only through [`Backend`], which is shared as
//! `Arc<dyn Backend>`.
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │  FixedCellStrategy   │   │ RingExpansionStrategy│
//! │  get / set           │   │ mget / mset          │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            │                          │
//!            ▼                          ▼
//! ┌─────────────────────────────────────────────────┐
//! │              Arc<dyn Backend>                   │
//! │   cell name (String) → encoded payload (bytes)  │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod providers;
mod traits;

pub use providers::{InstrumentedBackend, MemoryBackend, RoundTrips};
pub use traits::{Backend, BackendError, BoxFuture};
