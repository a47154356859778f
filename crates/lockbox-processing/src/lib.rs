//! Lockbox Processing Library
//!
//! Derivative generation for staged attachments: width-capped image scaling
//! and preview generation, plus the scanner capability stub. Generators
//! operate on local files between staging and persistence; they never touch
//! durable storage.

pub mod preview;
pub mod scaler;
pub mod scanner;

pub use preview::{ImagePreviewGenerator, PreviewGenerator, PreviewService, DEFAULT_PREVIEW_WIDTH};
pub use scaler::ImageScaler;
pub use scanner::{NoOpScanner, ScanOutcome, Scanner};
