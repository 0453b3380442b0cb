//! Media storage for course images and lecture videos.

use async_trait::async_trait;
use std::path::PathBuf;

use super::ServiceError;

/// URL prefix under which stored media is served
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["png", "jpg", "jpeg", "webp", "gif"],
            Self::Video => &["mp4", "webm", "mov", "mkv"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an upload and return its public path
    async fn store(&self, kind: MediaKind, file_name: &str, bytes: Vec<u8>) -> Result<String, ServiceError>;

    /// Remove previously stored media. Missing files are not an error.
    async fn remove(&self, public_path: &str) -> Result<(), ServiceError>;
}

/// Keep only characters that are safe in a file name
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Files under a local directory, served at `/uploads/`
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a public path back to a file inside the root, rejecting traversal
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path.strip_prefix(UPLOADS_URL_PREFIX)?;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, kind: MediaKind, file_name: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::Invalid(format!("Uploaded {} is empty", kind.as_str())));
        }
        let clean = sanitize_file_name(file_name);
        match extension(&clean) {
            Some(ext) if kind.allowed_extensions().contains(&ext.as_str()) => {}
            _ => {
                return Err(ServiceError::Invalid(format!(
                    "Unsupported {} type: {}",
                    kind.as_str(),
                    file_name
                )))
            }
        }

        tokio::fs::create_dir_all(&self.root).await?;
        let stored_name = format!("{}-{}", hex::encode(rand::random::<[u8; 8]>()), clean);
        tokio::fs::write(self.root.join(&stored_name), bytes).await?;

        tracing::debug!("Stored {} {}", kind.as_str(), stored_name);
        Ok(format!("{}{}", UPLOADS_URL_PREFIX, stored_name))
    }

    async fn remove(&self, public_path: &str) -> Result<(), ServiceError> {
        let Some(path) = self.resolve(public_path) else {
            return Err(ServiceError::Invalid(format!("Not a stored media path: {}", public_path)));
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
