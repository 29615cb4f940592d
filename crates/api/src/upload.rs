//! Multipart form reading and media-store bookkeeping shared by the
//! upload-backed resources.
//!
//! A handler that uploads first and writes the row second must not leave
//! an orphan behind: [`persist_or_discard`] destroys the new object when
//! the database write fails, and [`discard`] logs anything it could not
//! clean up so it can be removed by hand.

use std::collections::HashMap;
use std::future::Future;

use axum::extract::Multipart;
use entyre_core::coerce;
use entyre_core::error::CoreError;
use entyre_db::models::ImageRef;
use entyre_media::{MediaKind, MediaStore, MediaUpload, StoredMedia};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::multipart_error;

/// Image types accepted for article, banner, thumbnail, and icon uploads.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Media-store folders per resource.
pub const ARTICLES_FOLDER: &str = "entyre/articles";
pub const BANNERS_FOLDER: &str = "entyre/banners";
pub const VIDEO_THUMBNAILS_FOLDER: &str = "entyre/videosThumbnail";
pub const ICONS_FOLDER: &str = "entyre/workflowFiles";

/// The `file` part of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> i64 {
        self.bytes.len() as i64
    }
}

/// A fully buffered multipart form: text fields plus at most one file.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Drain the request. A file part without a name and without bytes
    /// (an empty `<input type="file">`) counts as no file.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else if !name.is_empty() {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    /// The raw value of a text field, if it was sent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A text field with the literal `"null"` and `"undefined"` that
    /// browser forms send for cleared inputs read as empty.
    pub fn nullable_text(&self, name: &str) -> Option<String> {
        self.text(name).map(|raw| match raw {
            "null" | "undefined" => String::new(),
            other => other.to_string(),
        })
    }

    /// A required, non-blank text field. Pushes a message and returns
    /// `None` when it is missing.
    pub fn required(&self, name: &str, errors: &mut Vec<String>) -> Option<String> {
        match self.text(name).map(str::trim) {
            Some(value) if !value.is_empty() => Some(value.to_string()),
            _ => {
                errors.push(format!("{name} is required"));
                None
            }
        }
    }

    /// A field that, when sent, must not be blank.
    pub fn non_blank(&self, name: &str, errors: &mut Vec<String>) -> Option<String> {
        let value = self.text(name)?.trim();
        if value.is_empty() {
            errors.push(format!("{name} must not be empty"));
            return None;
        }
        Some(value.to_string())
    }

    /// A loosely typed boolean field. Unrecognized values are reported.
    pub fn flag(&self, name: &str, errors: &mut Vec<String>) -> Option<bool> {
        let raw = self.text(name)?;
        let parsed = coerce::loose_bool(&Value::String(raw.to_string()));
        if parsed.is_none() {
            errors.push(format!("{name} must be true or false, got '{raw}'"));
        }
        parsed
    }
}

/// Fail with every collected message, or pass.
pub fn ensure_valid(errors: Vec<String>) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

/// Report a `file` part that is not one of [`IMAGE_MIME_TYPES`].
pub fn check_image(file: Option<&UploadedFile>, errors: &mut Vec<String>) {
    let Some(file) = file else {
        return;
    };
    match file.content_type.as_deref() {
        Some(ct) if IMAGE_MIME_TYPES.contains(&ct) => {}
        other => errors.push(format!(
            "Unsupported image type '{}'. Must be one of: {}",
            other.unwrap_or("unknown"),
            IMAGE_MIME_TYPES.join(", ")
        )),
    }
}

/// Upload an image to `folder`.
pub async fn store_image(
    media: &dyn MediaStore,
    folder: &str,
    file: UploadedFile,
) -> AppResult<StoredMedia> {
    let stored = media
        .upload(MediaUpload {
            folder: folder.to_string(),
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
            kind: MediaKind::Image,
            public_id: None,
        })
        .await?;
    tracing::debug!(public_id = %stored.public_id, %folder, "Image stored");
    Ok(stored)
}

/// [`store_image`] for forms where the file is optional.
pub async fn store_optional_image(
    media: &dyn MediaStore,
    folder: &str,
    file: Option<UploadedFile>,
) -> AppResult<Option<StoredMedia>> {
    match file {
        Some(file) => store_image(media, folder, file).await.map(Some),
        None => Ok(None),
    }
}

/// Run a database write. If it fails, destroy the object uploaded for it.
pub async fn persist_or_discard<T, F>(
    media: &dyn MediaStore,
    uploaded: Option<(&str, MediaKind)>,
    write: F,
) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match write.await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Some((public_id, kind)) = uploaded {
                discard(media, public_id, kind, "database write failed").await;
            }
            Err(AppError::Database(err))
        }
    }
}

/// Like [`persist_or_discard`] for updates, where a vanished row is also a
/// failure that leaves the new upload unreferenced.
pub async fn update_or_discard<T, F>(
    media: &dyn MediaStore,
    uploaded: Option<(&str, MediaKind)>,
    not_found: CoreError,
    write: F,
) -> AppResult<T>
where
    F: Future<Output = Result<Option<T>, sqlx::Error>>,
{
    match persist_or_discard(media, uploaded, write).await? {
        Some(value) => Ok(value),
        None => {
            if let Some((public_id, kind)) = uploaded {
                discard(media, public_id, kind, "record disappeared during update").await;
            }
            Err(not_found.into())
        }
    }
}

/// The image a multipart update moves the row to. A new upload wins; a
/// sent URL counts only when it differs from the stored one, and the row
/// then owns no remote object.
pub fn replacement_image(
    stored: Option<&StoredMedia>,
    sent_url: Option<&str>,
    current_url: Option<&str>,
) -> Option<ImageRef> {
    if let Some(stored) = stored {
        return Some(ImageRef {
            url: stored.url.clone(),
            public_id: Some(stored.public_id.clone()),
        });
    }
    let url = sent_url.map(str::trim).filter(|url| !url.is_empty())?;
    (Some(url) != current_url).then(|| ImageRef {
        url: url.to_string(),
        public_id: None,
    })
}

/// Once an update has committed, destroy the object the row used to own
/// if it no longer references it.
pub async fn discard_replaced(
    media: &dyn MediaStore,
    previous_public_id: Option<&str>,
    replacement: Option<&ImageRef>,
    kind: MediaKind,
    reason: &str,
) {
    let (Some(previous), Some(replacement)) = (previous_public_id, replacement) else {
        return;
    };
    if replacement.public_id.as_deref() != Some(previous) {
        discard(media, previous, kind, reason).await;
    }
}

/// Best-effort removal of a remote object. Failures are logged with the
/// public id for manual reconciliation and otherwise ignored.
pub async fn discard(media: &dyn MediaStore, public_id: &str, kind: MediaKind, reason: &str) {
    match media.destroy(public_id, kind).await {
        Ok(()) => tracing::info!(%public_id, %reason, "Remote media removed"),
        Err(e) => tracing::warn!(
            %public_id,
            kind = kind.as_str(),
            %reason,
            error = %e,
            "Failed to remove remote media; orphaned object left behind",
        ),
    }
}
