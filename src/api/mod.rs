//! HTTP surface
//!
//! Thin actix-web adapters over the link services. Every response body is an
//! [`response::ApiResponse`] envelope.

pub mod instance;
pub mod response;
pub mod services;

pub use instance::InstanceContext;
pub use services::configure_routes;
