//! Photo payloads travel as `data:` URIs
//!
//! The client reads an image file into bytes and encodes it here before
//! upload; the API decodes the header to validate what it stores.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Errors raised while reading a photo data URI
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhotoError {
    #[error("photo must be a data URI")]
    NotDataUri,

    #[error("photo must be an image, got {0}")]
    NotAnImage(String),

    #[error("photo must be base64 encoded")]
    NotBase64,

    #[error("photo is empty")]
    Empty,

    #[error("photo is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Guess an image MIME type from a file name extension
pub fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Encode raw image bytes as `data:<mime>;base64,<payload>`
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Header information of a validated photo data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoInfo {
    pub mime: String,
    pub size: usize,
}

/// Validate a photo data URI and report its MIME type and decoded size
pub fn inspect_data_uri(uri: &str, limit: usize) -> Result<PhotoInfo, PhotoError> {
    let rest = uri.strip_prefix("data:").ok_or(PhotoError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(PhotoError::NotDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(PhotoError::NotBase64)?;

    if !mime.starts_with("image/") {
        return Err(PhotoError::NotAnImage(mime.to_string()));
    }

    // Reject on the encoded length first so oversized payloads are never decoded.
    let estimated = payload.len() / 4 * 3;
    if estimated > limit + 2 {
        return Err(PhotoError::TooLarge {
            size: estimated,
            limit,
        });
    }

    let bytes = STANDARD.decode(payload).map_err(|_| PhotoError::NotBase64)?;
    if bytes.is_empty() {
        return Err(PhotoError::Empty);
    }
    if bytes.len() > limit {
        return Err(PhotoError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }

    Ok(PhotoInfo {
        mime: mime.to_string(),
        size: bytes.len(),
    })
}
