//! Favicon normalization
//!
//! Fetches the favicon (through the response cache), decodes it, shrinks it to
//! exactly 32x32 when both sides are larger than that, and re-encodes it as a
//! `data:` URL. Images already 32 pixels or less on either side are re-encoded
//! at their original size.

use crate::fetch::{Fetcher, RequestParams};
use crate::resolver::PublisherInfo;
use crate::ResolveError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::time::Duration;

/// Side length of a normalized favicon
pub const FAVICON_SIZE: u32 = 32;

/// Replaces `favicon_url` with a normalized data URL
///
/// Records without a favicon pass through untouched. Fetch and decode
/// failures are returned as errors.
pub async fn normalize_favicon(
    fetcher: &Fetcher,
    mut info: PublisherInfo,
    timeout: Option<Duration>,
) -> Result<PublisherInfo, ResolveError> {
    let Some(favicon_url) = info.favicon_url.clone() else {
        return Ok(info);
    };

    let params = RequestParams::from_url(&favicon_url)?
        .binary()
        .with_timeout(timeout);
    let fetched = fetcher.fetch_cached(&params).await?;

    let data_url = favicon_data_url(&fetched.payload.bytes()).map_err(|e| ResolveError::Image {
        url: favicon_url.clone(),
        message: e.to_string(),
    })?;

    tracing::debug!("Normalized favicon {} ({} bytes)", favicon_url, data_url.len());
    info.favicon_url = Some(data_url);
    Ok(info)
}

/// Decodes image bytes and re-encodes them as a (possibly resized) data URL
///
/// The source format is kept when it can be encoded; anything else becomes PNG.
pub fn favicon_data_url(bytes: &[u8]) -> Result<String, image::ImageError> {
    let source_format = image::guess_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, source_format)?;

    let normalized = shrink_to_favicon(decoded);

    let format = output_format(source_format);
    let mut encoded = Cursor::new(Vec::new());
    encodable_image(normalized, format).write_to(&mut encoded, format)?;

    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(encoded.into_inner())
    ))
}

/// Resizes to exactly 32x32 unless either side is already 32 or less
pub fn shrink_to_favicon(image: DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= FAVICON_SIZE || height <= FAVICON_SIZE {
        return image;
    }

    image.resize_exact(FAVICON_SIZE, FAVICON_SIZE, FilterType::Lanczos3)
}

fn output_format(source: ImageFormat) -> ImageFormat {
    match source {
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::Gif
        | ImageFormat::Bmp
        | ImageFormat::Ico => source,
        _ => ImageFormat::Png,
    }
}

/// Converts pixel layouts an encoder cannot take
fn encodable_image(image: DynamicImage, format: ImageFormat) -> DynamicImage {
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::Png => image,
        _ => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}
