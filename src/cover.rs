//! cover.rs
//! Shared cover-art plumbing: extension/mime validation, decoding,
//! downsampling, and the temp-file staging used by cover resizes.

use std::io::{Cursor, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";

/// Encoding of a stored cover picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFormat {
    Jpeg,
    Png,
}

impl CoverFormat {
    /// Parse a user-supplied extension. Only jpg, jpeg and png qualify.
    pub fn from_extension(ext: &str) -> Result<CoverFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(CoverFormat::Jpeg),
            "png" => Ok(CoverFormat::Png),
            other => Err(Error::WrongPictureFormat(other.to_string())),
        }
    }

    /// Format of an already-stored picture, judged by its mime type.
    /// Anything that is not PNG is treated as JPEG.
    pub fn from_mime(mime: &str) -> CoverFormat {
        if mime == MIME_PNG {
            CoverFormat::Png
        } else {
            CoverFormat::Jpeg
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            CoverFormat::Jpeg => "jpg",
            CoverFormat::Png => "png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            CoverFormat::Jpeg => MIME_JPEG,
            CoverFormat::Png => MIME_PNG,
        }
    }
}

/// Mime type for an external cover file, validating its extension.
pub fn mime_for_path(path: &Path) -> Result<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    Ok(CoverFormat::from_extension(ext)?.mime())
}

/// File suffix matching a stored picture's mime type.
pub fn suffix_for_mime(mime: &str) -> &'static str {
    CoverFormat::from_mime(mime).suffix()
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Height that keeps `image`'s aspect ratio at the requested width.
pub fn scaled_height(image: &DynamicImage, width: u32) -> u32 {
    let (w, h) = image.dimensions();
    let aspect = f64::from(w) / f64::from(h);
    (f64::from(width) / aspect).round() as u32
}

/// Downsample `image` to exactly `width` wide, stamp the encoder
/// identity into its embedded metadata, and stage the result as a
/// collision-resistant temp file inside `dir`. The file is removed when
/// the returned guard drops, whether or not the caller's next step
/// succeeds.
pub fn write_resized_temp(
    image: &DynamicImage,
    width: u32,
    format: CoverFormat,
    dir: &Path,
) -> Result<NamedTempFile> {
    let height = scaled_height(image, width);
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);

    let mut encoded = Vec::new();
    match format {
        CoverFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut encoded, 100);
            encoder.encode_image(&resized)?;
        }
        CoverFormat::Png => {
            resized.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;
        }
    }

    let mut staged = tempfile::Builder::new()
        .prefix(".cover-")
        .suffix(&format!(".{}", format.suffix()))
        .tempfile_in(dir)?;
    staged.write_all(&encoded)?;
    staged.flush()?;
    stamp_metadata(staged.path())?;
    debug!(
        "staged {}x{} cover at {}",
        width,
        height,
        staged.path().display()
    );
    Ok(staged)
}

/// Stamp the encoder identity (software/author) into the image file's
/// embedded metadata.
fn stamp_metadata(path: &Path) -> Result<()> {
    let mut metadata = Metadata::new();
    metadata.set_tag(ExifTag::Software(format!(
        "{} v. {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )));
    metadata.set_tag(ExifTag::Artist(env!("CARGO_PKG_NAME").to_string()));
    metadata
        .write_to_file(path)
        .map_err(|e| Error::CoverMetadata(e.to_string()))
}
