//! Core Module
//!
//! Configuration, shared server state and the HTTP bootstrap.

pub mod config;
pub mod server;
pub mod state;

// Re-exports
pub use config::Config;
pub use server::Server;
pub use state::ServerState;
