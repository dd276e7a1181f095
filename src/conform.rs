use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use tracing::debug;

use crate::rasterizer::RasterizeError;

/// What had to happen to a converter's output to make it a `size`x`size` PNG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conformance {
    /// Already the right dimensions
    Exact,
    /// Scaled from the given dimensions
    Resized { width: u32, height: u32 },
}

/// Make sure `path` holds a decodable square PNG of exactly `size` pixels.
///
/// Quick Look only bounds the thumbnail's longest edge, and ImageMagick keeps
/// the aspect ratio, so anything off-size is resampled with Lanczos3.
/// Undecodable output is deleted so a broken icon never survives the run.
pub fn conform_output(tool: &str, path: &Path, size: u32) -> Result<Conformance, RasterizeError> {
    if !path.exists() {
        return Err(RasterizeError::MissingOutput {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        });
    }

    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            let _ = fs::remove_file(path);
            return Err(RasterizeError::BadOutput {
                tool: tool.to_string(),
                source: e,
            });
        }
    };

    let (width, height) = img.dimensions();
    if width == size && height == size {
        return Ok(Conformance::Exact);
    }

    debug!(tool, width, height, size, "resizing converter output");

    let resized = image::imageops::resize(&img.to_rgba8(), size, size, FilterType::Lanczos3);
    resized
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| RasterizeError::BadOutput {
            tool: tool.to_string(),
            source: e,
        })?;

    Ok(Conformance::Resized { width, height })
}
