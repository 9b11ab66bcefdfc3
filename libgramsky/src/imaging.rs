//! Image upload-limit enforcement
//!
//! Guarantees an image either fits the platform's blob ceiling or is rejected
//! with a diagnosable error. One resize pass is attempted, never a retry loop
//! with progressively smaller targets. The source file on disk is never
//! touched; only the in-memory bytes change.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader};
use tracing::{debug, warn};

use crate::error::MediaError;
use crate::limits::{IMAGE_LONG_EDGE, MAX_IMAGE_BYTES};

const JPEG_QUALITY: u8 = 80;

/// Enforce the image blob ceiling on `bytes`.
///
/// Bytes at or under the limit pass through untouched, without being decoded.
/// Oversized images are resized once to the long-edge target and re-encoded;
/// if that is still over the limit the image is rejected.
pub fn enforce_upload_limit(bytes: Vec<u8>, label: &str) -> Result<Vec<u8>, MediaError> {
    if bytes.len() <= MAX_IMAGE_BYTES {
        return Ok(bytes);
    }

    let image = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| {
            warn!("Cannot sniff format of '{}': {}", label, e);
            MediaError::UnreadableDimensions(label.to_string())
        })?
        .decode()
        .map_err(|e| {
            warn!("Cannot decode '{}': {}", label, e);
            MediaError::UnreadableDimensions(label.to_string())
        })?;

    let (width, height) = image.dimensions();
    let resized = match resize_target(width, height) {
        Some((target_w, target_h)) => {
            debug!(
                "Resizing '{}' from {}x{} to {}x{}",
                label, width, height, target_w, target_h
            );
            image.resize_exact(target_w, target_h, image::imageops::FilterType::Lanczos3)
        }
        // Already within the long-edge target; re-encode only.
        None => image,
    };

    let out = encode_jpeg(&resized)?;
    if out.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::StillTooLarge {
            label: label.to_string(),
            size: out.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }

    debug!(
        "Reduced '{}' from {} to {} bytes",
        label,
        bytes.len(),
        out.len()
    );
    Ok(out)
}

/// Compute the resize target for an oversized image, or `None` when the long
/// edge is already within bounds.
///
/// Landscape clamps width to the long-edge target, portrait clamps height; an
/// exact square is treated as landscape (width wins). The other axis scales
/// proportionally. Never upscales.
pub fn resize_target(width: u32, height: u32) -> Option<(u32, u32)> {
    if width >= height {
        if width <= IMAGE_LONG_EDGE {
            return None;
        }
        let scaled = (height as u64 * IMAGE_LONG_EDGE as u64 / width as u64).max(1) as u32;
        Some((IMAGE_LONG_EDGE, scaled))
    } else {
        if height <= IMAGE_LONG_EDGE {
            return None;
        }
        let scaled = (width as u64 * IMAGE_LONG_EDGE as u64 / height as u64).max(1) as u32;
        Some((scaled, IMAGE_LONG_EDGE))
    }
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, MediaError> {
    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use rand::{Rng, SeedableRng};

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn noise_image(width: u32, height: u32) -> RgbImage {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        RgbImage::from_fn(width, height, |_, _| image::Rgb(rng.gen()))
    }

    #[test]
    fn test_under_limit_passes_through_unchanged() {
        let bytes = vec![0u8; 1024];
        let out = enforce_upload_limit(bytes.clone(), "small.jpg").unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_exactly_at_limit_passes_through() {
        let bytes = vec![7u8; MAX_IMAGE_BYTES];
        let out = enforce_upload_limit(bytes.clone(), "edge.jpg").unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_oversized_undecodable_is_rejected() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        let result = enforce_upload_limit(bytes, "garbage.jpg");
        assert!(matches!(result, Err(MediaError::UnreadableDimensions(_))));
    }

    #[test]
    fn test_oversized_image_never_silently_over_limit() {
        // Incompressible noise guarantees the PNG input exceeds the ceiling.
        let bytes = png_bytes(noise_image(2400, 1200));
        assert!(bytes.len() > MAX_IMAGE_BYTES);

        match enforce_upload_limit(bytes, "noise.png") {
            Ok(out) => assert!(out.len() <= MAX_IMAGE_BYTES),
            Err(MediaError::StillTooLarge { size, limit, .. }) => {
                assert!(size > limit);
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_resize_target_landscape_clamps_width() {
        assert_eq!(resize_target(3840, 2160), Some((1920, 1080)));
    }

    #[test]
    fn test_resize_target_portrait_clamps_height() {
        assert_eq!(resize_target(2160, 3840), Some((1080, 1920)));
    }

    #[test]
    fn test_resize_target_square_clamps_width() {
        assert_eq!(resize_target(2000, 2000), Some((1920, 1920)));
    }

    #[test]
    fn test_resize_target_never_upscales() {
        assert_eq!(resize_target(1920, 1080), None);
        assert_eq!(resize_target(640, 480), None);
        assert_eq!(resize_target(1080, 1920), None);
        assert_eq!(resize_target(1920, 1920), None);
    }

    #[test]
    fn test_resize_target_extreme_aspect_ratio_floor() {
        // Scaled axis never collapses to zero.
        let (w, h) = resize_target(100_000, 10).unwrap();
        assert_eq!(w, 1920);
        assert!(h >= 1);
    }
}
