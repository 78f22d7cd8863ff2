//! In-memory cache provider.

mod store;

pub use store::MemoryCacheProvider;
