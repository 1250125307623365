//! Inline images.

use std::fs;
use std::path::Path;

use base64::Engine;

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::error::{PageError, Result};
use crate::escape::html_escape;

/// MIME type for an image file extension.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Image bytes with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    mime: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageData {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Read an image file; the MIME type comes from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime = image_mime_type(path).ok_or_else(|| {
            PageError::Configuration(format!(
                "unsupported image type: {}",
                path.display()
            ))
        })?;
        Ok(Self::new(mime, fs::read(path)?))
    }

    /// `data:` URI carrying the image.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// A single embedded image.
#[derive(Debug, Clone)]
pub struct Picture {
    id: String,
    image: ImageData,
    alt: String,
}

impl Picture {
    pub fn new(id: impl Into<String>, image: ImageData) -> Self {
        let id = id.into();
        Self {
            alt: id.clone(),
            id,
            image,
        }
    }

    /// Picture read from an image file.
    pub fn from_path(id: impl Into<String>, path: &Path) -> Result<Self> {
        Ok(Self::new(id, ImageData::from_path(path)?))
    }

    /// Set the alt text (defaults to the id).
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }
}

impl VisualElement for Picture {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Picture
    }

    fn appearance_fragment(&self, _ctx: &RenderContext<'_>) -> String {
        format!(
            "<img class=\"tv-picture\" src=\"{}\" alt=\"{}\">",
            self.image.data_uri(),
            html_escape(&self.alt)
        )
    }
}
