//! SurrealDB repository implementations.

mod store;

pub use store::SurrealStoreRepository;
