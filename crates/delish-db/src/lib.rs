//! Delish Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connecting to a server or embedded engine ([`connect`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - [`repository::SurrealStoreRepository`], the SurrealDB implementation of
//!   [`delish_core::repository::StoreRepository`]

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, connect};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
