//! Delish Core: domain model, error types and repository traits shared
//! by every crate in the workspace.

pub mod error;
pub mod models;
pub mod repository;
pub mod slug;
pub mod tags;
