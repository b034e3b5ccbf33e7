//! Image normalization before upload.
//!
//! Only JPEG and PNG payloads ever reach the network. Formats the analysis
//! backend rejects (WebP, JFIF/JPE-named files) are decoded and re-encoded
//! as JPEG at their natural size; everything else is validated and passed
//! through untouched.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use tracing::{info, warn};

use super::types::{ImageFile, NormalizedImage};
use crate::error::ScanError;

/// JPEG quality used when re-encoding converted images.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Media types accepted for upload as-is.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// File extensions that always go through conversion.
const CONVERT_EXTENSIONS: [&str; 3] = ["jfif", "jpe", "webp"];

/// Declared media types that always go through conversion.
const CONVERT_MEDIA_TYPES: [&str; 1] = ["image/webp"];

/// Normalize a selected file into a canonical upload payload.
///
/// # Errors
/// - `InvalidFileType` if the declared media type is not `image/*`
/// - `ConversionFailed` if a convertible image cannot be decoded or encoded
/// - `UnsupportedFormat` if the result is still not JPEG or PNG
pub fn normalize_image(file: &ImageFile, jpeg_quality: u8) -> Result<NormalizedImage, ScanError> {
    let media_type = file.media_type.trim().to_ascii_lowercase();

    if !media_type.starts_with("image/") {
        warn!("Rejected '{}': declared type '{}' is not an image", file.file_name, file.media_type);
        return Err(ScanError::InvalidFileType {
            media_type: file.media_type.clone(),
        });
    }

    let normalized = if needs_conversion(&file.file_name, &media_type) {
        info!(
            "Converting '{}' ({}, {} bytes) to JPEG",
            file.file_name,
            media_type,
            file.size()
        );
        let bytes = convert_to_jpeg(&file.bytes, jpeg_quality)?;
        info!("Converted '{}': {} -> {} bytes", file.file_name, file.size(), bytes.len());
        NormalizedImage {
            bytes,
            media_type: "image/jpeg".to_string(),
            file_name: rewrite_extension(&file.file_name, "jpg"),
            converted: true,
        }
    } else {
        NormalizedImage {
            bytes: file.bytes.clone(),
            media_type: canonical_media_type(&media_type),
            file_name: file.file_name.clone(),
            converted: false,
        }
    };

    if !is_accepted_media_type(&normalized.media_type) {
        warn!(
            "Rejected '{}': '{}' is not an accepted upload format",
            file.file_name, normalized.media_type
        );
        return Err(ScanError::UnsupportedFormat {
            media_type: normalized.media_type,
        });
    }

    Ok(normalized)
}

/// Async entry point: decode and encode run on the blocking pool.
///
/// The work is single-shot; dropping the returned future does not stop a
/// conversion that already started, its output is simply discarded.
pub async fn normalize_image_async(
    file: ImageFile,
    jpeg_quality: u8,
) -> Result<NormalizedImage, ScanError> {
    tokio::task::spawn_blocking(move || normalize_image(&file, jpeg_quality))
        .await
        .map_err(|e| ScanError::ConversionFailed(format!("Conversion task panicked: {}", e)))?
}

pub fn is_accepted_media_type(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&media_type)
}

/// Whether the file carries one of the markers that force re-encoding.
pub fn needs_conversion(file_name: &str, media_type: &str) -> bool {
    let by_extension = extension_of(file_name)
        .map(|ext| CONVERT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    by_extension || CONVERT_MEDIA_TYPES.contains(&media_type)
}

/// Text after the last `.`, lowercased. Dotfile names such as `.webp`
/// count as all extension.
fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// "image/jpg" is a common alias; report it under its registered name.
fn canonical_media_type(media_type: &str) -> String {
    match media_type {
        "image/jpg" => "image/jpeg".to_string(),
        other => other.to_string(),
    }
}

fn rewrite_extension(file_name: &str, extension: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    format!("{}.{}", stem, extension)
}

/// Decode into a raster surface and re-encode as JPEG.
/// The raster lives only inside this function.
fn convert_to_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, ScanError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ScanError::ConversionFailed(format!("Failed to load image: {}", e)))?;

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    drop(img);

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder.encode_image(&rgb).map_err(|e| {
            ScanError::ConversionFailed(format!("Failed to encode image to JPEG: {}", e))
        })?;
    }

    Ok(buffer.into_inner())
}
