use std::path::{Path, PathBuf};

use crate::config::UploadLimits;
use crate::error::UploadError;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A local video picked for upload. Size and type are known up front so the
/// limits can be checked before anything is read or sent.
#[derive(Debug, Clone)]
pub struct VideoFile {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    source: Source,
}

impl VideoFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| unreadable(path, err))?;
        if !metadata.is_file() {
            return Err(UploadError::Unreadable {
                path: path.display().to_string(),
                detail: "not a regular file".into(),
            });
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            size: metadata.len(),
            source: Source::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| content_type_for(&file_name).to_string());

        Self {
            file_name,
            content_type,
            size: bytes.len() as u64,
            source: Source::Bytes(bytes),
        }
    }

    /// Size is the hard gate. A non-video type is refused; a video type
    /// outside the picker's accept list only warns.
    pub fn validate(&self, limits: &UploadLimits) -> Result<(), UploadError> {
        if self.size > limits.max_size_bytes {
            return Err(UploadError::FileTooLarge {
                size: self.size,
                max: limits.max_size_bytes,
            });
        }

        let content_type = self.content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with("video/") {
            return Err(UploadError::UnsupportedType {
                content_type: self.content_type.clone(),
            });
        }

        if !limits
            .accepted_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&content_type))
        {
            log_warn!(
                "{} has type {} outside the accepted list; uploading anyway",
                self.file_name,
                self.content_type
            );
        }

        Ok(())
    }

    pub async fn into_bytes(self) -> Result<Vec<u8>, UploadError> {
        match self.source {
            Source::Bytes(bytes) => Ok(bytes),
            Source::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|err| unreadable(&path, err)),
        }
    }
}

fn unreadable(path: &Path, err: std::io::Error) -> UploadError {
    UploadError::Unreadable {
        path: path.display().to_string(),
        detail: err.to_string(),
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("m4v") => "video/x-m4v",
        Some("mov") | Some("qt") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
