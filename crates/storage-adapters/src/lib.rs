//! # storage-adapters
//!
//! `BoardRepo` implementations: SQLite through sqlx for real deployments,
//! an in-memory arena for tests and ephemeral runs.

mod memory;
mod sqlite;

pub use memory::MemoryBoardRepo;
pub use sqlite::SqliteBoardRepo;
