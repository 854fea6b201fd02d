//! Blob store client for product images
//!
//! Uploads within one call run concurrently; the returned URLs correspond
//! index-wise to the input order, not to completion order. Removal is a
//! secondary effect of record deletion and is therefore best-effort: a blob
//! that is already gone must never fail the primary operation.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};

/// An image file to upload
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Blob-store seam: keyed put returning a durable retrieval URL, keyed delete
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn put(&self, upload: &AssetUpload) -> CatalogResult<String>;

    async fn delete(&self, url: &str) -> CatalogResult<()>;
}

/// Upload all files concurrently, preserving input order in the result
///
/// The first failure fails the whole call. Blobs that finished uploading
/// before the failure are left behind; callers treat this as an accepted
/// leak rather than attempting cleanup of half-finished work.
pub async fn upload_all<S: AssetStore + ?Sized>(
    store: &S,
    uploads: &[AssetUpload],
) -> CatalogResult<Vec<String>> {
    futures::future::try_join_all(uploads.iter().map(|upload| store.put(upload))).await
}

/// Remove a blob, logging and swallowing any failure
pub async fn remove_best_effort<S: AssetStore + ?Sized>(store: &S, url: &str) {
    match store.delete(url).await {
        Ok(()) => debug!(%url, "asset removed"),
        Err(e) => warn!(%url, error = %e, "asset removal failed, continuing"),
    }
}

/// Build a globally unique storage key for an uploaded file
///
/// Time-based prefix plus a random component so concurrent uploads of
/// identically named files by different users never collide.
pub fn storage_key(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitized
    )
}

/// HTTP blob store client
///
/// `PUT {endpoint}/{key}` stores a blob; the public URL handed back to
/// callers is `{public_base}/{key}`. `DELETE` goes back through the endpoint
/// using the key taken from the public URL.
pub struct HttpAssetStore {
    client: reqwest::Client,
    endpoint: String,
    public_base: String,
}

impl HttpAssetStore {
    pub fn new(config: &core_config::assets::AssetStoreConfig) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            public_base: config.public_base.trim_end_matches('/').to_string(),
        })
    }

    fn key_from_url<'a>(&self, url: &'a str) -> &'a str {
        url.rsplit('/').next().unwrap_or(url)
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn put(&self, upload: &AssetUpload) -> CatalogResult<String> {
        let key = storage_key(&upload.file_name);

        let response = self
            .client
            .put(format!("{}/{}", self.endpoint, key))
            .header(reqwest::header::CONTENT_TYPE, &upload.content_type)
            .body(upload.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Remote(format!(
                "blob store returned {} for '{}'",
                response.status(),
                key
            )));
        }

        debug!(%key, "asset uploaded");
        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn delete(&self, url: &str) -> CatalogResult<()> {
        let key = self.key_from_url(url);

        let response = self
            .client
            .delete(format!("{}/{}", self.endpoint, key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Remote(format!(
                "blob store returned {} deleting '{}'",
                response.status(),
                key
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> AssetUpload {
        AssetUpload {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8],
        }
    }

    #[test]
    fn test_storage_key_sanitizes_name() {
        let key = storage_key("my photo (1).jpg");
        assert!(key.ends_with("my-photo--1-.jpg"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_storage_key_unique_for_same_name() {
        let a = storage_key("photo.jpg");
        let b = storage_key("photo.jpg");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_upload_all_preserves_input_order() {
        let mut store = MockAssetStore::new();
        store.expect_put().returning(|upload| {
            let url = format!("https://cdn/{}", upload.file_name);
            Ok(url)
        });

        let uploads = vec![upload("a.jpg"), upload("b.jpg"), upload("c.jpg")];
        let urls = upload_all(&store, &uploads).await.unwrap();

        assert_eq!(
            urls,
            vec!["https://cdn/a.jpg", "https://cdn/b.jpg", "https://cdn/c.jpg"]
        );
    }

    #[tokio::test]
    async fn test_upload_all_fails_on_first_error() {
        let mut store = MockAssetStore::new();
        store.expect_put().returning(|upload| {
            if upload.file_name == "b.jpg" {
                Err(CatalogError::Remote("disk full".to_string()))
            } else {
                Ok(format!("https://cdn/{}", upload.file_name))
            }
        });

        let uploads = vec![upload("a.jpg"), upload("b.jpg")];
        let result = upload_all(&store, &uploads).await;
        assert!(matches!(result, Err(CatalogError::Remote(_))));
    }

    #[tokio::test]
    async fn test_remove_best_effort_swallows_errors() {
        let mut store = MockAssetStore::new();
        store
            .expect_delete()
            .returning(|_| Err(CatalogError::Remote("already gone".to_string())));

        // Must not panic or propagate
        remove_best_effort(&store, "https://cdn/x.jpg").await;
    }
}
