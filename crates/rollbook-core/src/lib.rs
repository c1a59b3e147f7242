//! Rollbook core library
//!
//! Domain models, error types, configuration and field validation shared by
//! the rollbook crates. Nothing in this crate talks to the network or the
//! filesystem; storage and face-analysis collaborators live in their own
//! crates.

pub mod config;
pub mod dedupe;
pub mod error;
pub mod models;
pub mod validation;

pub use config::{Config, StorageBackendKind};
pub use error::{AppError, ErrorMetadata, LogLevel};
