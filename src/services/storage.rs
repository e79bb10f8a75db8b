//! Image upload to blob storage

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Object store receiving uploaded files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `data` under `blob_name` and return its public URL
    async fn put(&self, blob_name: &str, content_type: &str, data: Vec<u8>) -> AppResult<String>;
}

/// Blob service reached over HTTP (`PUT {base_url}/{container}/{blob}`)
pub struct HttpBlobStorage {
    client: reqwest::Client,
    config: StorageConfig,
}

impl HttpBlobStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn blob_url(&self, blob_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.container,
            blob_name
        )
    }
}

#[async_trait]
impl BlobStorage for HttpBlobStorage {
    async fn put(&self, blob_name: &str, content_type: &str, data: Vec<u8>) -> AppResult<String> {
        let url = self.blob_url(blob_name);
        let upload_url = match self.config.sas_token.as_deref() {
            Some(sas) if !sas.is_empty() => format!("{}?{}", url, sas.trim_start_matches('?')),
            _ => url.clone(),
        };

        let response = self
            .client
            .put(&upload_url)
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("Blob store answered {}: {}", status, body)));
        }

        Ok(url)
    }
}

/// Upload result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub blob_name: String,
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn BlobStorage>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn BlobStorage>) -> Self {
        Self { storage }
    }

    pub async fn upload(&self, file_name: Option<&str>, content_type: &str, data: Vec<u8>) -> AppResult<UploadResponse> {
        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(format!(
                "Uploaded file exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        let blob_name = blob_name_for(file_name);
        let size = data.len();
        let url = self.storage.put(&blob_name, content_type, data).await?;
        tracing::info!(blob = %blob_name, size, "File uploaded");

        Ok(UploadResponse {
            success: true,
            url,
            blob_name,
        })
    }
}

/// Random blob name keeping the original extension
fn blob_name_for(file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_name_keeps_extension() {
        let name = blob_name_for(Some("Portrait.PNG"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);

        assert_eq!(blob_name_for(None).len(), 36);
        assert_eq!(blob_name_for(Some("README")).len(), 36);
    }

    #[test]
    fn upload_stores_the_bytes_and_returns_the_url() {
        let mut storage = MockBlobStorage::new();
        storage
            .expect_put()
            .withf(|name, content_type, data| {
                name.ends_with(".jpg") && content_type == "image/jpeg" && data.as_slice() == b"pixels"
            })
            .times(1)
            .returning(|name, _, _| Ok(format!("http://blobs.test/images/{}", name)));

        let service = UploadService::new(Arc::new(storage));
        let response = tokio_test::block_on(service.upload(Some("hero.jpg"), "image/jpeg", b"pixels".to_vec())).unwrap();

        assert!(response.success);
        assert_eq!(response.url, format!("http://blobs.test/images/{}", response.blob_name));
    }

    #[test]
    fn empty_upload_never_reaches_storage() {
        let mut storage = MockBlobStorage::new();
        storage.expect_put().times(0);

        let service = UploadService::new(Arc::new(storage));
        let result = tokio_test::block_on(service.upload(Some("empty.png"), "image/png", Vec::new()));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn storage_failure_is_propagated() {
        let mut storage = MockBlobStorage::new();
        storage
            .expect_put()
            .withf(|_, content_type, _| content_type == "image/png")
            .returning(|_, _, _| Err(AppError::Storage("unreachable".to_string())));

        let service = UploadService::new(Arc::new(storage));
        let result = tokio_test::block_on(service.upload(Some("a.png"), "image/png", vec![1, 2, 3]));
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[test]
    fn blob_url_joins_base_and_container() {
        let storage = HttpBlobStorage::new(StorageConfig {
            base_url: "http://blobs.test/".to_string(),
            container: "images".to_string(),
            sas_token: None,
        });
        assert_eq!(storage.blob_url("x.png"), "http://blobs.test/images/x.png");
    }
}
