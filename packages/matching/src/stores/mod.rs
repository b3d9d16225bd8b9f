//! Database and engine implementations.
//!
//! Available backends:
//! - `MemoryDatabase` - In-memory process database
//! - `FactorEngine` - Scores from stored per-unit characterization results
//!
//! Both are usually built from one `DatabaseSnapshot` JSON file.

pub mod factors;
pub mod memory;
pub mod snapshot;

pub use factors::{FactorEngine, FactorError, Inventory};
pub use memory::MemoryDatabase;
pub use snapshot::DatabaseSnapshot;
