//! Candidate file model and acceptance rules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::error_handling::types::ValidationError;

/// Accepted container hints, matched as substrings of the media type or the lowercase name.
pub const ALLOWED_VIDEO_TYPES: [&str; 5] = ["mp4", "avi", "mov", "wmv", "quicktime"];

/// 100 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Where the bytes of a candidate file live until submission.
#[derive(Debug, Clone)]
pub enum Payload {
    Memory(Arc<Vec<u8>>),
    Disk(PathBuf),
}

/// A file selected for analysis: its declared metadata plus the means to read it.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    payload: Payload,
}

impl MediaFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            payload: Payload::Memory(Arc::new(bytes)),
        }
    }

    /// Describes a file on disk. The media type is guessed from the extension and the content
    /// is only read at submission time.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ValidationError::Unreadable(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(ValidationError::Unreadable(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or_default()
            .to_string();
        debug!(
            "Described {} as {} ({} bytes)",
            path.display(),
            media_type,
            metadata.len()
        );

        Ok(Self {
            name,
            media_type,
            size: metadata.len(),
            payload: Payload::Disk(path.to_path_buf()),
        })
    }

    /// Media type sent with the upload.
    pub fn upload_media_type(&self) -> &str {
        if self.media_type.is_empty() {
            "application/octet-stream"
        } else {
            &self.media_type
        }
    }

    pub async fn read_payload(&self) -> std::io::Result<Vec<u8>> {
        match &self.payload {
            Payload::Memory(bytes) => Ok(bytes.as_ref().clone()),
            Payload::Disk(path) => tokio::fs::read(path).await,
        }
    }
}

/// Type first, then size.
pub fn validate(file: &MediaFile, max_bytes: u64) -> Result<(), ValidationError> {
    let lowercase_name = file.name.to_lowercase();
    let type_ok = ALLOWED_VIDEO_TYPES
        .iter()
        .any(|hint| file.media_type.contains(hint) || lowercase_name.contains(hint));
    if !type_ok {
        return Err(ValidationError::UnsupportedType {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
        });
    }

    if file.size > max_bytes {
        return Err(ValidationError::TooLarge {
            size: file.size,
            limit: max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accepts_uppercase_extension() {
        let file = MediaFile::from_bytes("movie.MP4", "video/mp4", vec![0u8; 135]);
        assert_eq!(file.size, 135);
        assert!(validate(&file, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_pdf() {
        let file = MediaFile::from_bytes("doc.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(matches!(
            validate(&file, MAX_UPLOAD_BYTES),
            Err(ValidationError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_matches_by_name_when_type_is_generic() {
        let file = MediaFile::from_bytes("capture.wmv", "application/octet-stream", vec![0]);
        assert!(validate(&file, MAX_UPLOAD_BYTES).is_ok());
        let file = MediaFile::from_bytes("clip", "video/quicktime", vec![0]);
        assert!(validate(&file, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let file = MediaFile::from_bytes("edge.avi", "video/avi", vec![0u8; 16]);
        assert!(validate(&file, 16).is_ok());
        assert_eq!(
            validate(&file, 15),
            Err(ValidationError::TooLarge {
                size: 16,
                limit: 15
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let too_large = ValidationError::TooLarge {
            size: MAX_UPLOAD_BYTES + 1,
            limit: MAX_UPLOAD_BYTES,
        };
        assert_eq!(too_large.to_string(), "File size must be less than 100MB");
        let bad_type = ValidationError::UnsupportedType {
            name: "doc.pdf".into(),
            media_type: "application/pdf".into(),
        };
        assert_eq!(
            bad_type.to_string(),
            "Please select a valid video file (MP4, AVI, MOV, WMV)"
        );
    }

    #[tokio::test]
    async fn test_from_path_guesses_type_and_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.mp4");
        let f = std::fs::File::create(&path).unwrap();
        f.set_len(101 * 1024 * 1024).unwrap();

        let file = MediaFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "big.mp4");
        assert_eq!(file.media_type, "video/mp4");
        assert_eq!(file.size, 101 * 1024 * 1024);
        assert!(matches!(
            validate(&file, MAX_UPLOAD_BYTES),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = MediaFile::from_path(dir.path().join("absent.mp4")).await;
        assert!(matches!(result, Err(ValidationError::Unreadable(_))));
    }

    #[tokio::test]
    async fn test_read_payload_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.mov");
        std::fs::write(&path, b"moov").unwrap();

        let file = MediaFile::from_path(&path).await.unwrap();
        assert_eq!(file.read_payload().await.unwrap(), b"moov");
        assert_eq!(file.upload_media_type(), "video/quicktime");
    }
}
