//! Durable, content-addressed extraction cache with a 24h TTL.
//!
//! Every extraction stage shares one [`CacheStore`]. Entries live one per file under
//! `<root>/<category>/<key>.json` and are written through a temp file plus rename, so
//! concurrent writers never observe a torn record and the last rename wins.

pub mod error;
pub mod store;
pub mod types;


pub use error::{CacheError, CacheResult};
pub use store::CacheStore;
pub use types::{CacheEntry, CacheStats};
