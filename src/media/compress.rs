//! Image compression
//!
//! Decodes JPEG/PNG input, downscales it to fit the configured bounds and
//! re-encodes it as JPEG. Images are never upscaled. An optional thumbnail is
//! produced from the same decoded image.

use crate::media::error::{MediaError, MediaResult};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Output format of every compressed image
pub const COMPRESSED_CONTENT_TYPE: &str = "image/jpeg";

/// Thumbnail bounds and quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailOptions {
    /// Longest side in pixels
    pub max_size: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_size: 200,
            quality: 70,
        }
    }
}

/// Resize bounds and JPEG quality for compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
    /// Produce a thumbnail alongside the main image
    pub thumbnail: Option<ThumbnailOptions>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: 1080,
            max_height: 1080,
            quality: 80,
            thumbnail: Some(ThumbnailOptions::default()),
        }
    }
}

impl CompressOptions {
    /// Builder: set bounds
    pub fn max_size(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Builder: set JPEG quality
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Builder: skip the thumbnail
    pub fn without_thumbnail(mut self) -> Self {
        self.thumbnail = None;
        self
    }
}

/// An encoded JPEG and its dimensions
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Result of compressing one image
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub image: EncodedImage,
    pub thumbnail: Option<EncodedImage>,
    /// Size of the input in bytes
    pub original_size: usize,
}

impl CompressedImage {
    /// Input size divided by output size
    pub fn ratio(&self) -> f64 {
        if self.image.data.is_empty() {
            0.0
        } else {
            self.original_size as f64 / self.image.data.len() as f64
        }
    }
}

/// Compress an image held in memory
pub fn compress_image(bytes: &[u8], options: &CompressOptions) -> MediaResult<CompressedImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| MediaError::Decode(e.to_string()))?;

    let main = fit_within(&decoded, options.max_width, options.max_height);
    let image = encode_jpeg(&main, options.quality)?;

    let thumbnail = match options.thumbnail {
        Some(thumb) => {
            let small = fit_within(&main, thumb.max_size, thumb.max_size);
            Some(encode_jpeg(&small, thumb.quality)?)
        }
        None => None,
    };

    Ok(CompressedImage {
        image,
        thumbnail,
        original_size: bytes.len(),
    })
}

/// Downscale to fit `max_width` x `max_height`, keeping aspect ratio
fn fit_within(img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img.clone();
    }
    img.resize(max_width.max(1), max_height.max(1), FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> MediaResult<EncodedImage> {
    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| MediaError::Encode(e.to_string()))?;

    Ok(EncodedImage {
        data,
        width: rgb.width(),
        height: rgb.height(),
    })
}
