//! Cloudinary upload API client.
//!
//! Uses signed uploads: the request parameters (excluding `file`,
//! `api_key`, and the signature fields) are sorted, joined as
//! `key=value&...`, suffixed with the API secret, and hashed with SHA-256.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::store::{MediaError, MediaKind, MediaStore, MediaUpload, StoredMedia};

/// Default API origin.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Credentials for a Cloudinary account.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Read `CLOUD_NAME`, `CLOUD_API_KEY`, and `CLOUD_API_SECRET`.
    /// Returns `None` unless all three are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            cloud_name: var("CLOUD_NAME")?,
            api_key: var("CLOUD_API_KEY")?,
            api_secret: var("CLOUD_API_SECRET")?,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    bytes: u64,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// HTTP client for the Cloudinary upload API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            kind.as_str(),
            action
        )
    }

    /// Build a multipart form carrying the signed parameters.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Form {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = sign(&params, &self.config.api_secret);

        let mut form = Form::new();
        for (key, value) in params {
            form = form.text(key, value);
        }
        form.text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MediaError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MediaError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        let mut params = vec![("folder", upload.folder.clone())];
        if let Some(public_id) = &upload.public_id {
            params.push(("public_id", public_id.clone()));
        }

        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name.clone());
        if let Some(content_type) = &upload.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = self.signed_form(params).part("file", part);

        let response = self
            .client
            .post(self.endpoint(upload.kind, "upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::parse_response(response).await?;

        tracing::info!(
            public_id = %uploaded.public_id,
            folder = %upload.folder,
            bytes = uploaded.bytes,
            "Media uploaded",
        );
        Ok(StoredMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            bytes: uploaded.bytes,
        })
    }

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaError> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())]);
        let response = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .multipart(form)
            .send()
            .await?;
        let outcome: DestroyResponse = Self::parse_response(response).await?;

        match outcome.result.as_str() {
            "ok" | "not found" => {
                tracing::info!(%public_id, result = %outcome.result, "Media destroyed");
                Ok(())
            }
            other => Err(MediaError::Rejected(format!(
                "destroy {public_id} returned '{other}'"
            ))),
        }
    }
}

/// Signature over the sorted `key=value` pairs followed by the secret.
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
