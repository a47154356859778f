//! Width-capping image scaler
//!
//! Rewrites an image in place at a target maximum width, preserving aspect
//! ratio with bilinear resampling. Images already at or below the target
//! width are left untouched. Callers must check `supported` before invoking
//! `scale`; unsupported MIME types are an input error.

use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat, ImageReader};
use lockbox_core::AppError;
use std::path::{Path, PathBuf};

pub const PNG: &str = "image/png";
pub const GIF: &str = "image/gif";
pub const JPEG: &str = "image/jpeg";

/// Map a MIME type onto the codec used to re-encode the scaled image.
fn image_format(content_type: &str) -> Result<ImageFormat, AppError> {
    match content_type {
        PNG => Ok(ImageFormat::Png),
        GIF => Ok(ImageFormat::Gif),
        JPEG | "image/jpg" => Ok(ImageFormat::Jpeg),
        other => Err(AppError::InvalidInput(format!(
            "unsupported image format: {}",
            other
        ))),
    }
}

#[derive(Clone)]
pub struct ImageScaler {
    supported: Vec<String>,
}

impl ImageScaler {
    pub fn new(supported: Vec<String>) -> Self {
        Self { supported }
    }

    /// Scaler covering the formats the bundled codecs handle.
    pub fn with_default_types() -> Self {
        Self::new(vec![PNG.to_string(), GIF.to_string(), JPEG.to_string()])
    }

    /// Whether the given MIME type can be scaled.
    pub fn supported(&self, content_type: &str) -> bool {
        self.supported.iter().any(|m| m == content_type)
    }

    /// Scale the image at `path` down to `target_width` in place. A no-op
    /// when the image is already narrower than or equal to the target.
    pub async fn scale(
        &self,
        path: &Path,
        target_width: u32,
        content_type: &str,
    ) -> Result<(), AppError> {
        if !self.supported(content_type) {
            return Err(AppError::InvalidInput(format!(
                "unsupported image format: {}",
                content_type
            )));
        }
        let format = image_format(content_type)?;

        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || scale_file(&path, target_width, format))
            .await
            .map_err(|e| AppError::Internal(format!("scale task failed: {}", e)))?
    }
}

fn scale_file(path: &Path, target_width: u32, format: ImageFormat) -> Result<(), AppError> {
    let src = ImageReader::open(path)
        .map_err(|e| AppError::Processing(format!("failed to open {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| AppError::Processing(format!("failed to probe image: {}", e)))?
        .decode()
        .map_err(|e| AppError::Processing(format!("failed to decode image: {}", e)))?;

    let (width, height) = src.dimensions();
    if width <= target_width {
        return Ok(());
    }

    let aspect_ratio = width as f64 / height as f64;
    let target_height = ((target_width as f64 / aspect_ratio).round() as u32).max(1);

    let scaled = src.resize_exact(target_width, target_height, FilterType::Triangle);
    scaled
        .save_with_format(path, format)
        .map_err(|e| AppError::Processing(format!("failed to encode scaled image: {}", e)))?;

    tracing::debug!(
        path = %path.display(),
        from_width = width,
        to_width = target_width,
        to_height = target_height,
        "image scaled"
    );

    Ok(())
}
