//! Database and configuration models.

#[cfg(feature = "server")]
pub mod auth;
pub mod config;
pub mod document;
