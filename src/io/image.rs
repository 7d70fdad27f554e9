//! Conversion between 8-bit RGB files and normalized channel planes

use crate::io::configuration::MAX_INTENSITY;
use crate::io::error::{CloneError, Result};
use crate::spatial::region::clip_unit;
use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::{Array3, ArrayView3};
use std::path::Path;

/// Number of channels produced by [`load_planes`]
pub const RGB_CHANNELS: usize = 3;

/// Map an 8-bit intensity into `[0, 1]`
pub fn to_unit_range(value: u8) -> f64 {
    f64::from(value) / MAX_INTENSITY
}

/// Map a normalized intensity back to 8 bits, clipping first
pub fn to_byte(value: f64) -> u8 {
    (clip_unit(value) * MAX_INTENSITY).round() as u8
}

/// Convert an RGB buffer into a `(height, width, 3)` array in `[0, 1]`
pub fn planes_from_rgb(rgb: &RgbImage) -> Array3<f64> {
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut planes = Array3::zeros((height, width, RGB_CHANNELS));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            if let Some(slot) = planes.get_mut((y as usize, x as usize, channel)) {
                *slot = to_unit_range(value);
            }
        }
    }
    planes
}

/// Convert a `(height, width, channels)` array back into an RGB buffer
///
/// Single-channel arrays are replicated into gray; extra channels are ignored.
///
/// # Errors
///
/// Returns an error if the array has no channels
pub fn rgb_from_planes(planes: ArrayView3<'_, f64>) -> Result<RgbImage> {
    let (height, width, channels) = planes.dim();
    if channels == 0 {
        return Err(crate::io::error::invalid_parameter(
            "channels",
            &channels,
            &"cannot encode an image without channels",
        ));
    }

    let sample = |row: usize, col: usize, channel: usize| {
        planes
            .get((row, col, channel.min(channels - 1)))
            .copied()
            .map_or(0, to_byte)
    };

    Ok(ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        Rgb([sample(row, col, 0), sample(row, col, 1), sample(row, col, 2)])
    }))
}

/// Load an image file as normalized RGB planes
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_planes<P: AsRef<Path>>(path: P) -> Result<Array3<f64>> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| CloneError::ImageLoad {
        path: path_buf,
        source: e,
    })?;
    Ok(planes_from_rgb(&img.to_rgb8()))
}

/// Save normalized planes as an 8-bit RGB image, creating parent directories
///
/// # Errors
///
/// Returns an error if the array has no channels, the parent directory cannot
/// be created, or the image cannot be written
pub fn save_planes<P: AsRef<Path>>(planes: ArrayView3<'_, f64>, path: P) -> Result<()> {
    let path = path.as_ref();
    let rgb = rgb_from_planes(planes)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CloneError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    rgb.save(path).map_err(|e| CloneError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}
