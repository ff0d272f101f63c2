//! # PicShare Shared Library
//!
//! Data-access layer for the PicShare backend: connection pooling, schema
//! migrations, row models and the user repository.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `models`: Database models (`User`, `Image`) and their queries
//! - `repository`: User operations called by the HTTP layer
//! - `avatar`: Best-effort avatar lookup (Gravatar)
//! - `error`: Repository error type

pub mod avatar;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;

/// Current version of the PicShare shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
