//! Tavola restaurant listing kernel.
//!
//! This library exposes kernel internals for integration testing.
//! The main entry point for running the server is the `tavola` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod theme;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
