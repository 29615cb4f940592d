//! In-process media store for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{MediaError, MediaKind, MediaStore, MediaUpload, StoredMedia};

#[derive(Debug, Clone)]
struct StoredObject {
    kind: MediaKind,
    bytes: Vec<u8>,
}

/// Keeps uploaded objects in a map and records every destroy call.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    destroyed: Mutex<Vec<String>>,
    next_id: AtomicU64,
    fail_uploads: AtomicBool,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following upload fail with a 503-style API error.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.objects.lock().await.contains_key(public_id)
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    /// Public IDs passed to `destroy`, in call order.
    pub async fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().await.clone()
    }

    /// Stored bytes of an object, if present.
    pub async fn bytes_of(&self, public_id: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(public_id)
            .map(|object| object.bytes.clone())
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::Api {
                status: 503,
                body: "upload failures enabled".to_string(),
            });
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let name = upload
            .public_id
            .clone()
            .unwrap_or_else(|| format!("upload_{n}"));
        let public_id = format!("{}/{}", upload.folder, name);
        let size = upload.bytes.len() as u64;

        self.objects.lock().await.insert(
            public_id.clone(),
            StoredObject {
                kind: upload.kind,
                bytes: upload.bytes,
            },
        );

        Ok(StoredMedia {
            url: format!("memory://{}/{public_id}", upload.kind.as_str()),
            public_id,
            bytes: size,
        })
    }

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaError> {
        self.destroyed.lock().await.push(public_id.to_string());
        let mut objects = self.objects.lock().await;
        match objects.get(public_id) {
            Some(object) if object.kind != kind => Err(MediaError::Rejected(format!(
                "{public_id} is stored as {}, not {}",
                object.kind.as_str(),
                kind.as_str()
            ))),
            _ => {
                objects.remove(public_id);
                Ok(())
            }
        }
    }
}
