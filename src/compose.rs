//! Side-by-side screenshot compositing
//!
//! Pastes screenshots left-to-right into one image for quick comparison
//! (e.g. the same page in light, dark, and amoled themes). Total width is
//! the sum of input widths, height is the tallest input, and shorter
//! inputs leave black below them.

use std::path::{Path, PathBuf};

use image::{GenericImageView, RgbaImage};
use tracing::info;

use crate::error::{VerifyError, VerifyResult};

/// Concatenate images horizontally, in input order
pub fn concat_horizontal(paths: &[PathBuf]) -> VerifyResult<RgbaImage> {
    if paths.is_empty() {
        return Err(VerifyError::EmptyComposite("<unnamed>".to_string()));
    }

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            return Err(VerifyError::ScreenshotMissing(
                path.to_string_lossy().to_string(),
            ));
        }
        images.push(image::open(path)?);
    }

    let total_width: u32 = images.iter().map(|i| i.width()).sum();
    let max_height: u32 = images.iter().map(|i| i.height()).max().unwrap_or(0);

    let mut combined = RgbaImage::new(total_width, max_height);
    let mut x_offset = 0u32;
    for img in &images {
        image::imageops::overlay(&mut combined, &img.to_rgba8(), x_offset as i64, 0);
        x_offset += img.width();
    }

    Ok(combined)
}

/// Build a composite from screenshot names and write it next to them
pub fn write_composite(
    screenshot_dir: &Path,
    name: &str,
    inputs: &[String],
) -> VerifyResult<PathBuf> {
    let paths: Vec<PathBuf> = inputs
        .iter()
        .map(|n| screenshot_dir.join(format!("{}.png", n)))
        .collect();

    let combined = concat_horizontal(&paths)?;
    let out_path = screenshot_dir.join(format!("{}.png", name));
    combined.save(&out_path)?;

    info!("Composite written to {}", out_path.display());
    Ok(out_path)
}
