//! # boardsync shared library
//!
//! This crate contains the types and business logic shared by the boardsync
//! API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `auth`: Password hashing, JWT tokens, authentication context
//! - `access`: Board access and ownership checks
//! - `ordering`: Sibling ordering for lists and tasks
//! - `db`: Connection pool and migrations

pub mod access;
pub mod auth;
pub mod db;
pub mod models;
pub mod ordering;

/// Current version of the boardsync shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
