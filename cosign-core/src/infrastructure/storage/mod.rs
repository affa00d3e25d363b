pub use query::{paginate, ListQuery, Page, SortDirection, SortField};
pub use rocks::RocksStorage;
pub use traits::*;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStorage;
pub mod query;
pub mod rocks;
pub mod traits;
