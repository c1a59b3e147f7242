//! Rollbook storage library
//!
//! Object-storage abstraction and backends.
//!
//! # Storage key format
//!
//! Keys are produced centrally by the [`naming`] module so both backends
//! stay consistent:
//!
//! - **Documents**: `student_files/{stem}_{suffix}.{ext}`
//! - **Avatars**: `avatar_images/{student_id}/{slug}_{suffix}.{ext}`
//!
//! `suffix` is a 4-character random alphanumeric token. Collisions are
//! improbable at this scale but not impossible; callers treat a conflicting
//! write as retryable. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod local;
pub mod naming;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use naming::InvalidFilename;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
