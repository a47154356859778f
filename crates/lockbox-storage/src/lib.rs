//! Lockbox Storage Library
//!
//! Backend-agnostic persistence for encrypted attachments. A backend accepts
//! a raw upload into local staging (`hold`), encrypts and persists the
//! attachment's local files (`upload`), and later fetches and decrypts them
//! (`download`).
//!
//! # Durable object naming
//!
//! Every attachment owns at most two durable objects, named deterministically
//! from its UID:
//!
//! - **Original**: `{uid}.enc`
//! - **Preview**: `{uid}.preview.enc`
//!
//! The local backend roots these under a per-attachment directory; the S3
//! backend roots them under an optional key prefix. Naming is centralized in
//! the `naming` module so write and read paths can never drift apart across
//! backends.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub(crate) mod naming;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
#[cfg(feature = "storage-local")]
pub use local::LocalVault;
pub use lockbox_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Vault;
pub use traits::{AttachmentStore, DownloadStream};
