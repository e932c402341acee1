//! Mode routing
//!
//! - Server mode (HTTP server + garbage collector)
//! - CLI mode (one-shot link management against the configured store)

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;
