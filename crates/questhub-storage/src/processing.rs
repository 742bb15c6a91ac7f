//! Upload normalisation: format check, downscale and re-encode.
//!
//! Re-encoding drops EXIF and any trailing payload from the original file.
//! JPEG stays JPEG at the configured quality; PNG and WebP become PNG.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, ImageReader, Limits};

use questhub_core::config::storage::StorageConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;

/// Sources may be this many times the output cap on either side before
/// decoding is refused.
const SOURCE_SIDE_FACTOR: u32 = 5;
/// Decoder allocation ceiling.
const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

/// A normalised image ready to store.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Encoded bytes.
    pub data: Bytes,
    /// MIME type of `data`.
    pub content_type: &'static str,
    /// File extension for the storage key.
    pub extension: &'static str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Validates and normalises uploaded images.
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    max_bytes: u64,
    max_dimension: u32,
    jpeg_quality: u8,
}

impl ImageProcessor {
    /// Create a processor with explicit limits.
    pub fn new(max_bytes: u64, max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            max_bytes,
            max_dimension: max_dimension.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Create a processor from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.max_image_size_bytes,
            config.max_image_dimension,
            config.jpeg_quality,
        )
    }

    /// Largest accepted upload in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validate, downscale and re-encode an upload.
    ///
    /// CPU-bound; call from a blocking task.
    pub fn process(&self, data: &[u8]) -> AppResult<ProcessedImage> {
        if data.is_empty() {
            return Err(AppError::validation("Image is empty"));
        }
        if data.len() as u64 > self.max_bytes {
            return Err(AppError::validation(format!(
                "Image is {} bytes; the limit is {} bytes",
                data.len(),
                self.max_bytes
            )));
        }

        let format = image::guess_format(data)
            .map_err(|_| AppError::validation("Unrecognised image format"))?;
        if !matches!(
            format,
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
        ) {
            return Err(AppError::validation(format!(
                "Unsupported image format {format:?}; expected JPEG, PNG or WebP"
            )));
        }

        let img = self.decode(data, format)?;

        let (w, h) = img.dimensions();
        let img = if w > self.max_dimension || h > self.max_dimension {
            img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
        } else {
            img
        };
        let (width, height) = img.dimensions();

        let mut buf = Vec::new();
        let (content_type, extension) = if format == ImageFormat::Jpeg {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality))
                .map_err(|e| AppError::internal(format!("Failed to encode JPEG: {e}")))?;
            ("image/jpeg", "jpg")
        } else {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| AppError::internal(format!("Failed to encode PNG: {e}")))?;
            ("image/png", "png")
        };

        Ok(ProcessedImage {
            data: Bytes::from(buf),
            content_type,
            extension,
            width,
            height,
        })
    }

    /// Largest source width or height accepted for decoding.
    pub fn max_source_side(&self) -> u32 {
        self.max_dimension.saturating_mul(SOURCE_SIDE_FACTOR)
    }

    /// Decode under dimension and allocation limits, so a small file that
    /// declares huge dimensions is refused from its header.
    fn decode(&self, data: &[u8], format: ImageFormat) -> AppResult<DynamicImage> {
        let side = self.max_source_side();
        let mut limits = Limits::default();
        limits.max_image_width = Some(side);
        limits.max_image_height = Some(side);
        limits.max_alloc = Some(MAX_DECODE_ALLOC);

        let mut reader = ImageReader::with_format(Cursor::new(data), format);
        reader.limits(limits);
        reader.decode().map_err(|e| match e {
            ImageError::Limits(_) => AppError::validation(format!(
                "Image dimensions are too large; each side must be at most {side} pixels"
            )),
            e => AppError::validation(format!("Failed to decode image: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    fn processor() -> ImageProcessor {
        ImageProcessor::new(5 * 1024 * 1024, 256, 80)
    }

    #[test]
    fn test_png_is_kept_as_png() {
        let png = encode(&RgbImage::from_pixel(40, 20, Rgb([10, 200, 30])), ImageFormat::Png);
        let out = processor().process(&png).unwrap();
        assert_eq!(out.content_type, "image/png");
        assert_eq!(out.extension, "png");
        assert_eq!((out.width, out.height), (40, 20));
    }

    #[test]
    fn test_large_jpeg_is_downscaled_keeping_aspect() {
        let jpeg = encode(&RgbImage::from_pixel(1024, 512, Rgb([120, 60, 10])), ImageFormat::Jpeg);
        let out = processor().process(&jpeg).unwrap();
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.extension, "jpg");
        assert_eq!((out.width, out.height), (256, 128));
        assert_eq!(image::guess_format(&out.data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_rejects_non_images_and_other_formats() {
        assert!(processor().process(b"not an image at all").is_err());
        assert!(processor().process(&[]).is_err());
        let bmp = encode(&RgbImage::new(4, 4), ImageFormat::Bmp);
        let err = processor().process(&bmp).unwrap_err();
        assert!(err.message.contains("Unsupported"));
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let png = encode(&RgbImage::new(64, 64), ImageFormat::Png);
        let tiny = ImageProcessor::new(16, 256, 80);
        assert!(tiny.process(&png).is_err());
    }

    #[test]
    fn test_refuses_to_decode_sources_past_the_side_limit() {
        let p = processor();
        assert_eq!(p.max_source_side(), 1280);

        let wide = encode(&RgbImage::new(1300, 4), ImageFormat::Png);
        let err = p.process(&wide).unwrap_err();
        assert!(err.message.contains("too large"), "{}", err.message);

        let fits = encode(&RgbImage::new(1280, 4), ImageFormat::Png);
        let out = p.process(&fits).unwrap();
        assert_eq!(out.width, 256);
    }
}
