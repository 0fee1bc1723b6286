//! # Lumora Common Library
//!
//! Shared code for the Lumora server and its tooling:
//! - Database initialization, schema and migrations
//! - Configuration loading and root folder resolution
//! - Password and session token primitives
//! - Rating arithmetic for reviews
//! - Shared API response types

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod scoring;

pub use error::{Error, Result};
pub use scoring::{ReviewSummary, REVIEW_CATEGORIES};
