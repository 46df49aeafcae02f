//! Services Layer
//!
//! Pure business logic extracted from HTTP handlers, so the import run and
//! the lookup queries can also be driven from the CLI entry point.

pub mod ncm_service;

// Re-export for convenience
pub use ncm_service::*;
