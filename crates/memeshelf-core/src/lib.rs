//! Memeshelf Core Library
//!
//! Domain models, error types, access rules, tag text handling and configuration
//! shared by every Memeshelf crate.

pub mod access;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod storage_types;
pub mod tags;

// Re-export commonly used types
pub use access::{can_modify, can_view, visibility, Caller, Owned, Visibility};
pub use config::{Config, ServerConfig, SiteConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, RejectionReason};
pub use pagination::PageWindow;
pub use storage_types::StorageBackend;
