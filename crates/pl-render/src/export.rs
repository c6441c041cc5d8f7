//! Raster export: RGBA pixels → PNG / JPEG file bytes.
//!
//! Export is a pure read of the live scene. The pixels come either from the
//! CPU rasterizer (`export_scene`) or from the browser canvas
//! (`encode_rgba` on `getImageData` output).

use crate::paint;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbImage, RgbaImage};
use pl_core::model::{Color, Scene};

/// JPEG quality used for lossy export (maximum).
pub const JPEG_QUALITY: u8 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("canvas has zero width or height")]
    EmptyCanvas,
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Output encodings offered by the export buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Lossless.
    Png,
    /// Lossy, no alpha channel.
    Jpeg,
}

impl ExportFormat {
    /// Accepts `png`, `jpeg` and `jpg`, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpeg" | "jpg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// Suggested download name, e.g. `design.jpg`.
    pub fn file_name(&self) -> String {
        format!("design.{}", self.extension())
    }
}

/// Encode straight-alpha RGBA pixels.
///
/// JPEG has no alpha channel, so translucent pixels are composited over
/// `background` first.
pub fn encode_rgba(
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    background: Color,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCanvas);
    }
    let expected = width as usize * height as usize * 4;
    let actual = rgba.len();
    let image = RgbaImage::from_raw(width, height, rgba).ok_or(ExportError::BufferSize {
        width,
        height,
        expected,
        actual,
    })?;

    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut out).write_image(
                image.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpeg => {
            let flat = flatten(&image, background);
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).write_image(
                flat.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgb8,
            )?;
        }
    }
    log::debug!(
        "encoded {width}x{height} {} ({} bytes)",
        format.extension(),
        out.len()
    );
    Ok(out)
}

/// Rasterize a scene on the CPU and encode it.
pub fn export_scene(scene: &Scene, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let pixmap = paint::rasterize(scene).ok_or(ExportError::EmptyCanvas)?;
    encode_rgba(
        paint::to_rgba(&pixmap),
        scene.width,
        scene.height,
        scene.background,
        format,
    )
}

/// Wrap encoded file bytes as a `data:` URL for a download link.
pub fn to_data_url(bytes: &[u8], format: ExportFormat) -> String {
    format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes))
}

fn flatten(image: &RgbaImage, background: Color) -> RgbImage {
    let bg = [background.r, background.g, background.b];
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let blend = |c: u8, under: u8| {
            ((c as u32 * a as u32 + under as u32 * (255 - a as u32) + 127) / 255) as u8
        };
        image::Rgb([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
    })
}
