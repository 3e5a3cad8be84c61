//! Image URL sanitation for vision content blocks

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Reasons an image reference cannot be sent to the vendor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageUrlError {
    #[error("image URL is empty")]
    Empty,
    #[error("image URL is not an http(s) URL, a data URI, or base64 image data")]
    Unsupported,
}

/// Normalize an image reference into something the vendor accepts
///
/// `http(s)` URLs and `data:` URIs are returned trimmed. Bare base64 payloads
/// are wrapped into a data URI whose media type is sniffed from the decoded
/// bytes, defaulting to JPEG.
pub fn sanitize_image_url(url: &str) -> Result<String, ImageUrlError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ImageUrlError::Empty);
    }

    if has_prefix_ignore_case(url, "http://")
        || has_prefix_ignore_case(url, "https://")
        || has_prefix_ignore_case(url, "data:")
    {
        return Ok(url.to_owned());
    }

    let bytes = STANDARD.decode(url).map_err(|_| ImageUrlError::Unsupported)?;
    Ok(format!("data:{};base64,{url}", sniff_media_type(&bytes)))
}

/// Like [`sanitize_image_url`], but keeps the original on failure
pub(crate) fn sanitize_or_keep(url: &str) -> String {
    sanitize_image_url(url).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "keeping unsanitized image URL");
        url.to_owned()
    })
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}
