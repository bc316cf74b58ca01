//! Supabase Storage [`BlobStore`] backend.
//!
//! Talks to the Supabase Storage REST API with a service-role key:
//! `POST /storage/v1/object/{bucket}/{key}` to upload,
//! `POST /storage/v1/object/sign/{bucket}/{path}` to mint signed URLs,
//! `DELETE /storage/v1/object/{bucket}/{path}` to remove. The signed
//! URL is the time-boxed retrieval capability; [`BlobStore::open`]
//! mints one scoped to the caller's TTL and streams the GET response,
//! so a download handle can never outlive the link it was issued for.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use vanish_blob::{BlobError, BlobReader, BlobStore};

/// Configuration for the Supabase Storage backend.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL (e.g. `https://abc.supabase.co`).
    pub url: String,
    /// Service-role API key.
    pub service_key: String,
    /// Storage bucket holding uploaded blobs.
    pub bucket: String,
    /// Request timeout for uploads and deletes.
    pub timeout: Duration,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            bucket: "files".to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("bucket", &self.bucket)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Response body of the object-sign endpoint.
#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// Supabase Storage-backed blob store.
pub struct SupabaseBlobStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseBlobStore {
    /// Create a new store from the provided configuration.
    pub fn new(config: SupabaseConfig) -> Result<Self, BlobError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BlobError::Storage(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a new store with a caller-supplied HTTP client.
    ///
    /// Useful for tests or for sharing a connection pool.
    #[must_use]
    pub fn with_client(config: SupabaseConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn base(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base(),
            self.config.bucket,
            path
        )
    }

    fn sign_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base(),
            self.config.bucket,
            path
        )
    }

    async fn api_error(context: &str, response: reqwest::Response) -> BlobError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        BlobError::Storage(format!("{context}: HTTP {status}: {body}"))
    }
}

#[async_trait]
impl BlobStore for SupabaseBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<String, BlobError> {
        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.config.service_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|e| BlobError::Storage(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::api_error("upload rejected", response).await);
        }
        Ok(key.to_owned())
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError> {
        let response = self
            .client
            .post(self.sign_url(path))
            .bearer_auth(&self.config.service_key)
            .json(&serde_json::json!({ "expiresIn": ttl.as_secs() }))
            .send()
            .await
            .map_err(|e| BlobError::Storage(format!("sign request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(path.to_owned()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error("sign rejected", response).await);
        }

        let sign: SignResponse = response
            .json()
            .await
            .map_err(|e| BlobError::Storage(format!("malformed sign response: {e}")))?;

        // The API returns a path relative to /storage/v1.
        Ok(format!("{}/storage/v1{}", self.base(), sign.signed_url))
    }

    async fn open(&self, path: &str, ttl: Duration) -> Result<BlobReader, BlobError> {
        let url = self.signed_url(path, ttl).await?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BlobError::Storage(format!("download failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(path.to_owned()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error("download rejected", response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let content_length = response.content_length();

        let stream = response
            .bytes_stream()
            .map_err(|e| BlobError::Storage(format!("download stream failed: {e}")));
        Ok(BlobReader {
            content_type,
            content_length,
            stream: Box::pin(stream),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.config.service_key)
            .send()
            .await
            .map_err(|e| BlobError::Storage(format!("delete failed: {e}")))?;

        // Missing objects delete successfully: the reaper retries.
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(Self::api_error("delete rejected", response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://proj.supabase.co/".to_owned(),
            service_key: "secret-key".to_owned(),
            ..SupabaseConfig::default()
        }
    }

    #[test]
    fn object_urls_strip_trailing_slash() {
        let store = SupabaseBlobStore::new(config()).unwrap();
        assert_eq!(
            store.object_url("1700-aa-report.pdf"),
            "https://proj.supabase.co/storage/v1/object/files/1700-aa-report.pdf"
        );
        assert_eq!(
            store.sign_url("1700-aa-report.pdf"),
            "https://proj.supabase.co/storage/v1/object/sign/files/1700-aa-report.pdf"
        );
    }

    #[test]
    fn debug_output_redacts_service_key() {
        let rendered = format!("{:?}", config());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn sign_response_parses_api_shape() {
        let parsed: SignResponse =
            serde_json::from_str(r#"{"signedURL":"/object/sign/files/x?token=abc"}"#).unwrap();
        assert_eq!(parsed.signed_url, "/object/sign/files/x?token=abc");
    }
}
