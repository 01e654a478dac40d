//! Downscale and compress note images into embedded data URIs.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::ImageSettings;
use crate::{Error, Result};

const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Compressed image ready to be stored on a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    /// Size of the encoded JPEG before base64
    pub encoded_len: usize,
}

/// Reject source files over the configured ceiling.
pub fn check_image_size(size: u64, settings: &ImageSettings) -> Result<()> {
    if size > settings.max_bytes {
        return Err(Error::ImageTooLarge {
            size,
            limit: settings.max_bytes,
        });
    }
    Ok(())
}

/// Decode `source_bytes`, cap the width while keeping the aspect ratio and
/// re-encode as JPEG.
///
/// Images narrower than `max_width` are not upscaled.
pub fn prepare_note_image(source_bytes: &[u8], settings: &ImageSettings) -> Result<NoteImage> {
    check_image_size(source_bytes.len() as u64, settings)?;
    if source_bytes.is_empty() {
        return Err(Error::InvalidInput("Image file is empty".to_string()));
    }

    let source = image::load_from_memory(source_bytes)
        .map_err(|error| Error::Image(format!("Failed to decode image: {error}")))?;

    let (source_width, source_height) = source.dimensions();
    let resized = if source_width > settings.max_width {
        let height = scaled_height(source_width, source_height, settings.max_width);
        source.resize_exact(settings.max_width, height, FilterType::Triangle)
    } else {
        source
    };
    let (width, height) = resized.dimensions();

    let bytes = encode_jpeg(&resized, settings.jpeg_quality)?;
    let encoded_len = bytes.len();
    let data_url = format!("{JPEG_DATA_URL_PREFIX}{}", STANDARD.encode(bytes));

    tracing::debug!(
        "Compressed image {}x{} -> {}x{} ({} bytes)",
        source_width,
        source_height,
        width,
        height,
        encoded_len
    );

    Ok(NoteImage {
        data_url,
        width,
        height,
        encoded_len,
    })
}

fn scaled_height(width: u32, height: u32, max_width: u32) -> u32 {
    let scaled =
        (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|error| Error::Image(format!("Failed to encode JPEG image: {error}")))?;
    Ok(cursor.into_inner())
}
