//! Pixel data substitution.
//!
//! Replaces the image payload of a dataset with the pixels of another image,
//! so that converted fixtures carry no patient imagery.

use std::path::Path;

use image::error::{LimitError, LimitErrorKind};
use image::{DynamicImage, ImageError, Rgb, RgbImage};

use crate::dictionary::tags;
use crate::error::Error;
use crate::limits::{CT_RESCALE_MAX, CT_RESCALE_MIN};
use crate::model::{Dataset, Element, Vr};

/// Side length of the placeholder image.
const PLACEHOLDER_SIZE: u32 = 32;

/// Rescales samples linearly so the smallest maps to `min` and the largest
/// to `max`.
///
/// A constant input maps every sample to `min`.
pub fn rescale(samples: &[f64], min: f64, max: f64) -> Vec<f64> {
    let (lo, hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let range = hi - lo;
    if range.is_nan() || range <= 0.0 {
        return vec![min; samples.len()];
    }
    samples
        .iter()
        .map(|&s| (s - lo) / range * (max - min) + min)
        .collect()
}

/// Replaces PixelData with the red channel of `image`, rescaled to
/// `[min, max]` and stored as little-endian signed 16-bit samples.
///
/// Rows and Columns are set to the image size. Returns `false`, leaving the
/// dataset untouched, when it has no PixelData.
pub fn replace_pixel_data(dataset: &mut Dataset, image: &DynamicImage, min: f64, max: f64) -> Result<bool, Error> {
    if !dataset.contains(tags::PIXEL_DATA) {
        return Ok(false);
    }

    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (Ok(columns), Ok(rows)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(Error::Image(ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::DimensionError,
        ))));
    };

    let red: Vec<f64> = rgb.pixels().map(|p| f64::from(p[0])).collect();
    let payload: Vec<u8> = rescale(&red, min, max)
        .into_iter()
        .flat_map(|v| (v as i16).to_le_bytes())
        .collect();

    tracing::debug!(rows, columns, bytes = payload.len(), "replacing pixel data");
    dataset.insert(Element::new(tags::PIXEL_DATA, Vr::OW, payload));
    dataset.insert(Element::new(tags::ROWS, Vr::US, i64::from(rows)));
    dataset.insert(Element::new(tags::COLUMNS, Vr::US, i64::from(columns)));
    Ok(true)
}

/// A small grayscale image with a radial gradient.
pub fn placeholder_image() -> DynamicImage {
    let center = (PLACEHOLDER_SIZE as f64 - 1.0) / 2.0;
    let image = RgbImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
        let dx = x as f64 - center;
        let dy = y as f64 - center;
        let distance = (dx * dx + dy * dy).sqrt() / (center * std::f64::consts::SQRT_2);
        let v = (255.0 * (1.0 - distance.min(1.0))) as u8;
        Rgb([v, v, v])
    });
    DynamicImage::ImageRgb8(image)
}

/// Replaces PixelData with the placeholder image, using CT-like values.
pub fn replace_with_placeholder(dataset: &mut Dataset) -> Result<bool, Error> {
    replace_pixel_data(dataset, &placeholder_image(), CT_RESCALE_MIN, CT_RESCALE_MAX)
}

/// Replaces PixelData with the image at `path`, using CT-like values.
pub fn replace_with_image_file(dataset: &mut Dataset, path: &Path) -> Result<bool, Error> {
    let image = image::open(path)?;
    tracing::info!(path = %path.display(), "replacing image data");
    replace_pixel_data(dataset, &image, CT_RESCALE_MIN, CT_RESCALE_MAX)
}
