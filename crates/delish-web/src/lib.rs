//! Delish Web: HTTP surface of the store directory.
//!
//! This crate provides:
//! - The axum [`router`] and [`Server`] wiring every route to its handler
//! - The photo upload pipeline ([`form::StoreSubmission`] buffering the
//!   multipart upload, [`photo::PhotoProcessor`] resizing it to disk)
//! - Cookie-backed flash notifications ([`flash`])
//! - maud page templates ([`views`])
//!
//! Handlers are generic over [`delish_core::repository::StoreRepository`],
//! so any persistence backend can be injected through [`AppState`].

pub mod config;
pub mod error;
pub mod flash;
pub mod form;
pub mod handlers;
pub mod photo;
pub mod server;
pub mod views;

pub use config::ServerConfig;
pub use error::WebError;
pub use server::{AppState, Server, router};
