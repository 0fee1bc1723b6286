//! Database access layer for lumora-server
//!
//! One module per table. Schema creation lives in `lumora_common::db`.

pub mod apps;
pub mod guides;
pub mod insights;
pub mod interviews;
pub mod reviews;
pub mod sessions;
pub mod settings;
pub mod studies;
pub mod users;
pub mod votes;
