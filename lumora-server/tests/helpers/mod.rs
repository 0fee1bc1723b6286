//! Test Helper Utilities
//!
//! Shared utilities for driving the lumora-server router in tests

#![allow(dead_code)]

pub mod chat_model;
pub mod site;
pub mod test_app;

pub use chat_model::ScriptedChatModel;
pub use site::serve_page;
pub use test_app::{review_json, TestApp};
