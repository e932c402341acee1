//! shortpath - a small URL shortener with self-expiring links
//!
//! Anyone can shorten a URL. Links may carry a password, always carry an
//! expiry and are removed by a periodic garbage collector once expired.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line link management
//!
//! # Architecture
//! - `storage`: `LinkStore` trait, SeaORM and in-memory backends
//! - `services`: path allocation, expiry policy, resolution, garbage collection
//! - `api`: HTTP handlers and the response envelope
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
