//! Routing of validated frames to type-specific handlers.
//!
//! The parser hands out `(type, payload)` pairs without looking at the
//! payload. This crate owns the table that says which tags are understood,
//! how long their payloads must be, and which handler runs for each.

pub mod config;
pub mod error;
pub mod registry;

pub use config::RegistryConfig;
pub use error::{DispatchError, Result};
pub use registry::{Dispatch, HandlerRegistry, PayloadLength};
