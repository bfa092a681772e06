//! Domain models for Delish.
//!
//! A store is the only persisted entity; tag counts are a read-side
//! aggregation over stores.

pub mod store;
