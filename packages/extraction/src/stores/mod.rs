//! Storage implementations.
//!
//! - [`MemoryStore`] - in-memory, for testing and development
//! - `SqliteStore` - file-based, behind the `sqlite` feature

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
