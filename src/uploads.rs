//! Image hosting: validated images are written under a local directory and
//! served back by URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::validation::{self, FieldError};
use crate::models::{ImageFile, ImageFolder};

/// URL path prefix hosted images are served under
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("invalid image: {}", validation::summarize(.0))]
    Invalid(Vec<FieldError>),

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Object storage for uploaded images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `image` under `folder` and return its public URL
    async fn store(&self, folder: ImageFolder, image: &ImageFile) -> Result<String, UploadError>;
}

/// Writes images to `<root>/<folder>/<uuid>.<ext>`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_url: String,
    allowed_types: Vec<String>,
    max_file_size: u64,
}

impl LocalImageStore {
    pub fn new(
        root: impl Into<PathBuf>,
        public_url: impl Into<String>,
        allowed_types: Vec<String>,
        max_file_size: u64,
    ) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            allowed_types,
            max_file_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.uploads_path(),
            config.public_url(),
            config.uploads.allowed_types.clone(),
            config.uploads.max_file_size,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name_for(image: &ImageFile) -> String {
        let ext = match image.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            _ => image.extension().unwrap_or("bin"),
        };
        format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, folder: ImageFolder, image: &ImageFile) -> Result<String, UploadError> {
        validation::validate_image(image, &self.allowed_types, self.max_file_size)
            .map_err(UploadError::Invalid)?;

        let dir = self.root.join(folder.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = Self::file_name_for(image);
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        tracing::debug!(
            folder = folder.as_str(),
            file = %file_name,
            bytes = image.bytes.len(),
            "Stored image"
        );
        Ok(format!(
            "{}{}/{}/{}",
            self.public_url,
            UPLOADS_ROUTE,
            folder.as_str(),
            file_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LocalImageStore {
        LocalImageStore::new(
            dir.path(),
            "http://localhost:7010/",
            vec!["image/png".to_string(), "image/jpeg".to_string()],
            1024,
        )
    }

    fn png(len: usize) -> ImageFile {
        ImageFile {
            file_name: "front.PNG".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![7; len],
        }
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let url = store.store(ImageFolder::Products, &png(16)).await.unwrap();
        assert!(url.starts_with("http://localhost:7010/uploads/products/"));
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join("products").join(file_name)).unwrap();
        assert_eq!(written.len(), 16);
    }

    #[tokio::test]
    async fn test_rejects_oversized_image() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir)
            .store(ImageFolder::Shops, &png(2048))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Invalid(_)));
        assert!(!dir.path().join("shops").exists());
    }

    #[tokio::test]
    async fn test_rejects_disallowed_type() {
        let dir = TempDir::new().unwrap();
        let gif = ImageFile {
            file_name: "a.gif".to_string(),
            content_type: "image/gif".to_string(),
            bytes: vec![1; 8],
        };
        let err = store(&dir).store(ImageFolder::Shops, &gif).await.unwrap_err();
        assert!(err.to_string().contains("Only image/png, image/jpeg files are allowed"));
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let a = store.store(ImageFolder::Shops, &png(4)).await.unwrap();
        let b = store.store(ImageFolder::Shops, &png(4)).await.unwrap();
        assert_ne!(a, b);
    }
}
