/// Writing finished color buffers to image files
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::buffer::ColorBuffer;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported image format: {0} (expected .png or .tga)")]
    UnsupportedFormat(PathBuf),
    #[error("buffer of {width}x{height} does not fit an image")]
    SizeMismatch { width: usize, height: usize },
}

/// Convert to a top-down RGBA image.
///
/// Buffers store the bottom row first, so rows are flipped.
pub fn to_image(buffer: &ColorBuffer) -> Result<RgbaImage, ExportError> {
    let (width, height) = (buffer.width(), buffer.height());
    let mismatch = || ExportError::SizeMismatch { width, height };
    let w = u32::try_from(width).map_err(|_| mismatch())?;
    let h = u32::try_from(height).map_err(|_| mismatch())?;

    let raw = (0..height)
        .rev()
        .flat_map(|y| buffer.row(y).iter().flat_map(|c| c.0))
        .collect();
    RgbaImage::from_raw(w, h, raw).ok_or_else(mismatch)
}

fn format_for(path: &Path) -> Result<ImageFormat, ExportError> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => Ok(ImageFormat::Png),
        Some("tga") => Ok(ImageFormat::Tga),
        _ => Err(ExportError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Save as PNG or TGA, chosen by the file extension
pub fn save(buffer: &ColorBuffer, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let format = format_for(path)?;
    to_image(buffer)?.save_with_format(path, format)?;
    log::info!(
        "wrote {}x{} image to {}",
        buffer.width(),
        buffer.height(),
        path.display()
    );
    Ok(())
}
