//! Cache Module
//!
//! Read-through caching with TTL freshness, single-flight population, and
//! pattern-based invalidation.

mod entry;
mod flight;
mod key;
mod read_through;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{make_key, KeyPart};
pub use read_through::Cache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Delimiter joining the parts of a composite key
pub const KEY_DELIMITER: char = ':';
