//! HTTP client for the REST collaborators

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::{Backend, BackendError};
use crate::config::Config;
use crate::models::{
    AuthRequest, CreateSellerRequest, ImageFile, ImageFolder, Seller, SubmissionReceipt,
    SubmitProductsRequest, UploadedImage, User,
};
use crate::rest::error::ErrorResponse;

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("leadcollect/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| BackendError::Decode(e.to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let body = serde_json::from_str::<ErrorResponse>(&text).unwrap_or_else(|_| ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("error")
                .to_ascii_lowercase(),
            message: text,
            details: None,
        });
        tracing::debug!(status = status.as_u16(), error = %body.error, "Request rejected");
        Err(BackendError::rejected(status.as_u16(), body))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::read(response).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn authenticate(&self, request: &AuthRequest) -> Result<User, BackendError> {
        self.post_json("/api/v1/auth", request).await
    }

    async fn upload_image(
        &self,
        folder: ImageFolder,
        image: ImageFile,
    ) -> Result<String, BackendError> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(&format!("/api/v1/uploads/{}", folder.as_str())))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let uploaded: UploadedImage = Self::read(response).await?;
        Ok(uploaded.url)
    }

    async fn create_seller(&self, request: &CreateSellerRequest) -> Result<Seller, BackendError> {
        self.post_json("/api/v1/sellers", request).await
    }

    async fn submit_products(
        &self,
        request: &SubmitProductsRequest,
    ) -> Result<SubmissionReceipt, BackendError> {
        self.post_json("/api/v1/products", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let backend = HttpBackend::new("http://localhost:7010/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:7010");
        assert_eq!(backend.url("/api/v1/auth"), "http://localhost:7010/api/v1/auth");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = backend
            .authenticate(&AuthRequest {
                name: "Alice".to_string(),
                phone: "9876543210".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
        assert!(err.is_transient());
    }
}
