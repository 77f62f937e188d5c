//! Image references and loaded textures.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

use crate::error::{ErrorCode, ViewerError, ViewerResult};

/// Location of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(Url);

impl ImageRef {
    /// Parses an image reference from a URL string.
    pub fn parse(s: &str) -> ViewerResult<Self> {
        Url::parse(s).map(Self).map_err(|e| {
            ViewerError::with_message(
                ErrorCode::InvalidImageRef,
                format!("Invalid image reference '{}': {}", s, e),
            )
        })
    }

    /// Creates a `file://` reference from an absolute path.
    pub fn from_path(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        Url::from_file_path(path).map(Self).map_err(|_| {
            ViewerError::with_message(
                ErrorCode::InvalidImageRef,
                format!("Path is not absolute: {}", path.display()),
            )
        })
    }

    /// Returns the URL scheme.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns the underlying URL.
    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for ImageRef {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

/// Encoded image formats recognized by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Detects the format from the file signature.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }
}

/// A loaded, still-encoded texture ready to hand to the renderer.
#[derive(Debug, Clone)]
pub struct Texture {
    source: ImageRef,
    format: ImageFormat,
    data: Bytes,
}

impl Texture {
    /// Wraps encoded image bytes, rejecting data in an unknown format.
    pub fn from_bytes(source: ImageRef, data: Bytes) -> ViewerResult<Self> {
        let format = ImageFormat::sniff(&data).ok_or_else(|| {
            ViewerError::with_message(
                ErrorCode::UnsupportedImageFormat,
                format!("Unrecognized image data in {}", source),
            )
        })?;
        Ok(Self {
            source,
            format,
            data,
        })
    }

    pub fn source(&self) -> &ImageRef {
        &self.source
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the encoded size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_signatures() {
        assert_eq!(ImageFormat::sniff(b"\x89PNG\r\n\x1a\n...."), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::sniff(b"plain text"), None);
    }

    #[test]
    fn test_texture_rejects_unknown_data() {
        let source = ImageRef::parse("mem://pages/a").unwrap();
        let err = Texture::from_bytes(source, Bytes::from_static(b"nope")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedImageFormat);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = ImageRef::parse("not a url").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageRef);
    }
}
