//! The media store contract.

use async_trait::async_trait;
use serde::Serialize;

/// Resource class of a stored object. Destroying an object requires the
/// same kind it was uploaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    /// Opaque files such as spreadsheets.
    Raw,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
        }
    }
}

/// A file to upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Destination folder, e.g. `entyre/articles`.
    pub folder: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub kind: MediaKind,
    /// Requested public ID (without folder). The store picks one if unset.
    pub public_id: Option<String>,
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
    pub bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The media service returned a non-2xx status code.
    #[error("Media service error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The media service answered 2xx but rejected the operation.
    #[error("Media service rejected the request: {0}")]
    Rejected(String),

    #[error("Media storage is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// Upload a file, returning its public URL and ID.
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError>;

    /// Delete an object. Deleting an object that no longer exists succeeds.
    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaError>;
}

/// Stand-in used when no media credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredMediaStore;

#[async_trait]
impl MediaStore for UnconfiguredMediaStore {
    async fn upload(&self, _upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        Err(MediaError::NotConfigured)
    }

    async fn destroy(&self, _public_id: &str, _kind: MediaKind) -> Result<(), MediaError> {
        Err(MediaError::NotConfigured)
    }
}
