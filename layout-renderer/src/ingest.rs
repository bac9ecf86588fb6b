//! Image ingestion: format detection, pixel dimensions and EXIF orientation.
//!
//! Images whose EXIF orientation is anything but "upright" are decoded,
//! rotated into display orientation and re-encoded as PNG so that every
//! later consumer can ignore EXIF entirely.

use std::io::Cursor;
use std::path::Path;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use layout_core::{ImageData, ImageFormat};

use crate::error::{RenderError, RenderResult};

/// Result of ingesting encoded image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedImage {
    /// Payload ready to place, in display orientation.
    pub data: ImageData,
    /// EXIF orientation tag of the input, when present.
    pub orientation: Option<u8>,
    /// Whether the pixels were rotated and re-encoded.
    pub normalized: bool,
}

fn exif_value(orientation: Orientation) -> u8 {
    match orientation {
        Orientation::NoTransforms => 1,
        Orientation::FlipHorizontal => 2,
        Orientation::Rotate180 => 3,
        Orientation::FlipVertical => 4,
        Orientation::Rotate90FlipH => 5,
        Orientation::Rotate90 => 6,
        Orientation::Rotate270FlipH => 7,
        Orientation::Rotate270 => 8,
    }
}

fn unreadable(bytes: Vec<u8>) -> IngestedImage {
    let format = ImageFormat::from_magic_bytes(&bytes);
    IngestedImage {
        data: ImageData::new(bytes, format, 0, 0),
        orientation: None,
        normalized: false,
    }
}

struct Probe {
    width: u32,
    height: u32,
    orientation: Option<Orientation>,
    normalized: Option<image::ImageResult<(Vec<u8>, u32, u32)>>,
}

fn probe(bytes: &[u8]) -> image::ImageResult<Probe> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let (width, height) = decoder.dimensions();
    let orientation = match decoder.exif_metadata() {
        Ok(Some(exif)) => Orientation::from_exif_chunk(&exif),
        Ok(None) => None,
        Err(e) => {
            tracing::debug!("Ignoring unreadable EXIF: {e}");
            None
        }
    };
    let normalized = match orientation {
        Some(o) if o != Orientation::NoTransforms => Some(normalize(decoder, o)),
        _ => None,
    };
    Ok(Probe {
        width,
        height,
        orientation,
        normalized,
    })
}

/// Ingest encoded image bytes.
///
/// Unreadable input is kept as-is with zero dimensions; a failed
/// normalisation falls back to the original bytes.
#[must_use]
pub fn ingest(bytes: Vec<u8>) -> IngestedImage {
    let format = ImageFormat::from_magic_bytes(&bytes);
    let probe = match probe(&bytes) {
        Ok(probe) => probe,
        Err(e) => {
            tracing::warn!("Unreadable image ({} bytes): {e}", bytes.len());
            return unreadable(bytes);
        }
    };
    let tag = probe.orientation.map(exif_value);

    match probe.normalized {
        Some(Ok((png, w, h))) => {
            tracing::debug!("Normalised EXIF orientation {:?} to {w}x{h}", tag);
            IngestedImage {
                data: ImageData::new(png, ImageFormat::Png, w, h),
                orientation: tag,
                normalized: true,
            }
        }
        Some(Err(e)) => {
            tracing::warn!("Could not apply EXIF orientation, keeping original: {e}");
            IngestedImage {
                data: ImageData::new(bytes, format, probe.width, probe.height),
                orientation: tag,
                normalized: false,
            }
        }
        None => IngestedImage {
            data: ImageData::new(bytes, format, probe.width, probe.height),
            orientation: tag,
            normalized: false,
        },
    }
}

fn normalize(
    decoder: impl ImageDecoder,
    orientation: Orientation,
) -> image::ImageResult<(Vec<u8>, u32, u32)> {
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    let (w, h) = (img.width(), img.height());
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok((out.into_inner(), w, h))
}

/// Read and ingest an image file.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the file cannot be read.
pub fn ingest_file(path: &Path) -> RenderResult<IngestedImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Resource(format!("{}: {e}", path.display())))?;
    Ok(ingest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode");
        out.into_inner()
    }

    #[test]
    fn test_plain_png_passes_through() {
        let bytes = png(6, 4);
        let ingested = ingest(bytes.clone());
        assert_eq!(ingested.data.bytes, bytes);
        assert_eq!(ingested.data.format, ImageFormat::Png);
        assert_eq!((ingested.data.width_px, ingested.data.height_px), (6, 4));
        assert_eq!(ingested.orientation, None);
        assert!(!ingested.normalized);
    }

    #[test]
    fn test_garbage_has_zero_dimensions() {
        let ingested = ingest(b"not an image at all".to_vec());
        assert_eq!(ingested.data.format, ImageFormat::Unknown);
        assert_eq!((ingested.data.width_px, ingested.data.height_px), (0, 0));
        assert!(!ingested.normalized);
    }

    #[test]
    fn test_exif_values() {
        assert_eq!(exif_value(Orientation::NoTransforms), 1);
        assert_eq!(exif_value(Orientation::Rotate90), 6);
        assert_eq!(exif_value(Orientation::Rotate270), 8);
    }

    #[test]
    fn test_missing_file() {
        let result = ingest_file(Path::new("/no/such/image.png"));
        assert!(matches!(result, Err(RenderError::Resource(_))));
    }
}
