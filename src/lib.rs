pub mod bootstrap;
pub mod cancel;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod flight;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod repository;
pub mod server;
pub mod state;
pub mod sync;
pub mod sync_state;

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
