//! Service layer for business logic
//!
//! The link-lifecycle engine shared by the HTTP handlers and the CLI.

pub mod expiry;
pub mod garbage_collector;
mod link_service;
pub mod path_allocator;
pub mod resolver;

pub use expiry::ExpiryPolicy;
pub use garbage_collector::{GarbageCollector, GcHandle};
pub use link_service::*;
pub use path_allocator::{Allocation, AllocationError, PathAllocator, PathRequest};
pub use resolver::{LinkResolver, Resolution};
