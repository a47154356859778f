//! Lockbox Core Library
//!
//! This crate provides the core domain models, error types, configuration and
//! service contracts that are shared across all Lockbox components: the
//! attachment lifecycle, the streaming encryption service, the key store and
//! the filer (metadata record store) contract.

pub mod config;
pub mod encryption;
pub mod error;
pub mod filer;
pub mod keystore;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, S3Config};
pub use encryption::{is_valid_key, AesGcmEncryption, ByteReader, Encryption};
pub use error::AppError;
pub use filer::Filer;
pub use keystore::{InMemoryKeyStore, KeyStore};
pub use models::{Attachment, AttachmentResponse, RawUpload};
pub use storage_types::StorageBackend;
