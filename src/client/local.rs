//! In-process backend over the service layer

use async_trait::async_trait;

use super::{Backend, BackendError};
use crate::models::{
    AuthRequest, CreateSellerRequest, ImageFile, ImageFolder, Seller, SubmissionReceipt,
    SubmitProductsRequest, User,
};
use crate::services::LeadService;

#[derive(Clone)]
pub struct LocalBackend {
    service: LeadService,
}

impl LocalBackend {
    pub fn new(service: LeadService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &LeadService {
        &self.service
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn authenticate(&self, request: &AuthRequest) -> Result<User, BackendError> {
        Ok(self.service.authenticate(request.clone()).await?)
    }

    async fn upload_image(
        &self,
        folder: ImageFolder,
        image: ImageFile,
    ) -> Result<String, BackendError> {
        Ok(self.service.upload_image(folder, image).await?.url)
    }

    async fn create_seller(&self, request: &CreateSellerRequest) -> Result<Seller, BackendError> {
        Ok(self.service.create_seller(request.clone()).await?)
    }

    async fn submit_products(
        &self,
        request: &SubmitProductsRequest,
    ) -> Result<SubmissionReceipt, BackendError> {
        Ok(self.service.submit_products(request.clone()).await?)
    }
}
