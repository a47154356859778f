//! Scanner capability stub
//!
//! The pipeline treats malware scanning as a pluggable capability with a
//! fixed interface. The bundled implementation accepts everything; a real
//! engine can be wired in behind the same trait.

use async_trait::async_trait;
use lockbox_core::AppError;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean,
    IssueDetected,
}

#[async_trait]
pub trait Scanner: Send + Sync {
    /// Scan a staged local file before it is persisted.
    async fn scan(&self, file_path: &Path) -> Result<ScanOutcome, AppError>;
}

/// Scanner that accepts every file.
pub struct NoOpScanner;

#[async_trait]
impl Scanner for NoOpScanner {
    async fn scan(&self, file_path: &Path) -> Result<ScanOutcome, AppError> {
        tracing::debug!(path = %file_path.display(), "scan skipped (no scanner configured)");
        Ok(ScanOutcome::Clean)
    }
}
