//! Photo resize stage of the upload pipeline.
//!
//! An accepted upload is decoded, resized to a fixed width with the height
//! following the aspect ratio, re-encoded in the format its content type
//! names and written to the uploads directory as `<uuid>.<subtype>`. The
//! write completes before the filename is handed to persistence.
//!
//! Both the decoded source and the resized target are bounded by
//! `max_dimension` on each side, so the pixel buffers stay small whatever
//! the aspect ratio of the upload.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};
use tracing::info;
use uuid::Uuid;

use crate::error::WebError;

/// Multipart field carrying the store photo.
pub const PHOTO_FIELD: &str = "photo";

/// A photo buffered in memory by the upload stage.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Declared content type, e.g. `image/jpeg`.
    pub content_type: String,
    pub bytes: Bytes,
}

pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// File extension for a content type: the subtype without parameters.
///
/// `image/jpeg` → `jpeg`, `image/png; q=1` → `png`.
pub fn extension_for(content_type: &str) -> Option<&str> {
    let (_, subtype) = content_type.split_once('/')?;
    let subtype = subtype.split(';').next().unwrap_or(subtype).trim();
    (!subtype.is_empty()).then_some(subtype)
}

/// Height that keeps `source`'s aspect ratio at `width`.
pub fn scaled_height(source: (u32, u32), width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return 0;
    }
    let h = (src_h as f64 * width as f64 / src_w as f64).round() as u32;
    h.max(1)
}

/// Resizes uploads and writes them under the uploads directory.
#[derive(Debug, Clone)]
pub struct PhotoProcessor {
    uploads_dir: PathBuf,
    width: u32,
    max_dimension: u32,
}

impl PhotoProcessor {
    pub fn new(uploads_dir: impl Into<PathBuf>, width: u32, max_dimension: u32) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            width,
            max_dimension,
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Pass through when nothing was uploaded, otherwise [`store`](Self::store).
    pub async fn accept(&self, upload: Option<PhotoUpload>) -> Result<Option<String>, WebError> {
        match upload {
            Some(upload) => self.store(upload).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resize `upload`, write it to disk and return the generated filename.
    pub async fn store(&self, upload: PhotoUpload) -> Result<String, WebError> {
        let extension = extension_for(&upload.content_type)
            .ok_or_else(|| WebError::Rejected {
                content_type: upload.content_type.clone(),
            })?
            .to_string();
        let format = ImageFormat::from_extension(&extension)
            .ok_or_else(|| WebError::Image(format!("unsupported image type: {extension}")))?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let (width, max_dimension) = (self.width, self.max_dimension);
        let bytes = upload.bytes;

        let encoded =
            tokio::task::spawn_blocking(move || resize(&bytes, width, max_dimension, format))
            .await
            .map_err(|e| WebError::Image(format!("resize task failed: {e}")))??;

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        let path = self.uploads_dir.join(&filename);
        tokio::fs::write(&path, &encoded).await?;

        info!(
            path = %path.display(),
            bytes = encoded.len(),
            "Photo written"
        );

        Ok(filename)
    }
}

fn decode(bytes: &[u8], max_dimension: u32) -> Result<DynamicImage, WebError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| WebError::Image(format!("failed to read photo: {e}")))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);
    reader.limits(limits);

    reader.decode().map_err(|e| match e {
        ImageError::Limits(_) => WebError::TooLarge,
        e => WebError::Image(format!("failed to decode photo: {e}")),
    })
}

fn resize(
    bytes: &[u8],
    width: u32,
    max_dimension: u32,
    format: ImageFormat,
) -> Result<Vec<u8>, WebError> {
    let image = decode(bytes, max_dimension)?;

    let height = scaled_height((image.width(), image.height()), width);
    if width > max_dimension || height > max_dimension {
        return Err(WebError::TooLarge);
    }
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);

    // JPEG has no alpha channel.
    let resized = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, format)
        .map_err(|e| WebError::Image(format!("failed to encode photo: {e}")))?;
    Ok(out.into_inner())
}
