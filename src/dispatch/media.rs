use std::fmt;
use std::fs;
use std::path::Path;

use image::ImageFormat;

use crate::dispatch::error::ValidationError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

/// Kind of file upload accepted by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file selected for upload, held in memory for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    kind: MediaKind,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl MediaFile {
    /// Reads `path` from disk after checking its extension against `kind`.
    pub fn load(path: &Path, kind: MediaKind) -> Result<Self, ValidationError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        check_extension(&file_name, kind)?;

        let bytes = fs::read(path).map_err(|source| ValidationError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(file_name, bytes, kind)
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        kind: MediaKind,
    ) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let extension = check_extension(&file_name, kind)?;
        let content_type = match kind {
            MediaKind::Image => image_content_type(&bytes, &extension),
            MediaKind::Video => video_content_type(&extension),
        };

        Ok(Self {
            kind,
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

}

// Payloads can be large; keep them out of logs.
impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("kind", &self.kind)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn check_extension(file_name: &str, kind: MediaKind) -> Result<String, ValidationError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if kind.allowed_extensions().contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(ValidationError::UnsupportedFileType { kind, extension })
    }
}

fn image_content_type(bytes: &[u8], extension: &str) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        _ => match extension {
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "image/jpeg",
        },
    }
}

fn video_content_type(extension: &str) -> &'static str {
    match extension {
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        _ => "video/mp4",
    }
}
