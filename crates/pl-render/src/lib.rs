pub mod export;
pub mod hit;
pub mod image_src;
pub mod paint;

pub use export::{ExportError, ExportFormat};
pub use image_src::{DecodedImage, ImageLoadError};
