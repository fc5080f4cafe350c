pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod error_pages;
pub mod filters;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod periods;
pub mod server;
pub mod state;
pub mod xsrf;

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
