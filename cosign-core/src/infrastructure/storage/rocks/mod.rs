//! RocksDB-backed storage implementation.
//!
//! See `engine.rs` for lock semantics and the main implementation.

pub mod engine;
pub mod migration;
pub mod schema;
pub mod util;

pub use engine::RocksStorage;
