//! Decoding of user-supplied image files and `data:` URL packing.
//!
//! Image objects keep their encoded file inline as a base64 `data:` URL so a
//! scene snapshot is self-contained. The pixel data is decoded once on
//! upload (to validate the file and learn its size) and again by the CPU
//! rasterizer on export.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

/// Failure to turn user bytes (or a stored `data:` URL) into pixels.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("image file is empty")]
    Empty,
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("not a base64 data URL")]
    InvalidDataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A decoded upload: its pixels plus what is needed to store it inline.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
    pub pixels: RgbaImage,
}

/// Decode an encoded image file (PNG, JPEG, GIF, BMP, WebP).
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    if bytes.is_empty() {
        return Err(ImageLoadError::Empty);
    }
    let format = image::guess_format(bytes).map_err(|_| ImageLoadError::UnknownFormat)?;
    let pixels = image::load_from_memory_with_format(bytes, format)?.to_rgba8();
    Ok(DecodedImage {
        width: pixels.width(),
        height: pixels.height(),
        mime: format.to_mime_type(),
        pixels,
    })
}

/// Pack encoded bytes into a `data:<mime>;base64,...` URL.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Unpack a base64 `data:` URL into its MIME type and encoded bytes.
pub fn parse_data_url(src: &str) -> Result<(&str, Vec<u8>), ImageLoadError> {
    let rest = src.strip_prefix("data:").ok_or(ImageLoadError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageLoadError::InvalidDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ImageLoadError::InvalidDataUrl)?;
    Ok((mime, STANDARD.decode(payload.trim())?))
}

/// Decode the pixels of a stored image object's `src`.
pub fn decode_data_url(src: &str) -> Result<DecodedImage, ImageLoadError> {
    let (_, bytes) = parse_data_url(src)?;
    decode(&bytes)
}
