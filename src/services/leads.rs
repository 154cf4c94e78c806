//! Lead capture service: users, sellers, images, product batches, dashboard.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::db::{self, dashboard, Analytics, DashboardPage, DashboardQuery, Database, DateRange, DbError, DbResult};
use crate::models::validation::{self, FieldError};
use crate::models::{
    AuthRequest, CreateSellerRequest, ImageFile, ImageFolder, Product, Seller, SubmissionReceipt,
    SubmitProductsRequest, UploadedImage, User,
};
use crate::session::Capacity;
use crate::uploads::{ImageStore, UploadError};

pub const PRODUCTS_CREATED: &str = "Products created successfully";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// Products whose MSP exceeds their MRP
    #[error("Invalid product prices: MSP cannot be greater than MRP for {}", .0.join(", "))]
    InvalidPrices(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    fn validation(message: &str, details: Vec<FieldError>) -> Self {
        ServiceError::Validation {
            message: format!("{}: {}", message, validation::summarize(&details)),
            details,
        }
    }
}

#[derive(Clone)]
pub struct LeadService {
    db: Database,
    images: Arc<dyn ImageStore>,
    capacity: Capacity,
}

impl LeadService {
    pub fn new(db: Database, images: Arc<dyn ImageStore>, capacity: Capacity) -> Self {
        Self {
            db,
            images,
            capacity,
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run a database closure off the async runtime
    async fn blocking<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
            .map_err(ServiceError::from)
    }

    /// Find the user by phone, creating or renaming as needed
    pub async fn authenticate(&self, request: AuthRequest) -> Result<User, ServiceError> {
        validation::validate_auth(&request)
            .map_err(|e| ServiceError::validation("Invalid credentials", e))?;

        let (user, outcome) = self
            .blocking(move |db| db::users::upsert_by_phone(db, &request.name, &request.phone))
            .await?;
        tracing::info!(user_id = %user.id, ?outcome, "User authenticated");
        Ok(user)
    }

    pub async fn upload_image(
        &self,
        folder: ImageFolder,
        image: ImageFile,
    ) -> Result<UploadedImage, ServiceError> {
        let url = self.images.store(folder, &image).await?;
        Ok(UploadedImage { url })
    }

    pub async fn create_seller(&self, request: CreateSellerRequest) -> Result<Seller, ServiceError> {
        validation::validate_seller(&request)
            .map_err(|e| ServiceError::validation("Invalid seller", e))?;

        let user_id = request.user_id.clone();
        if !self.blocking(move |db| db::users::exists(db, &user_id)).await? {
            return Err(ServiceError::NotFound("User"));
        }

        let seller = self
            .blocking(move |db| db::sellers::create(db, &request))
            .await?;
        tracing::info!(seller_id = %seller.id, user_id = %seller.user_id, "Seller created");
        Ok(seller)
    }

    /// Validate and insert a product batch atomically
    pub async fn submit_products(
        &self,
        request: SubmitProductsRequest,
    ) -> Result<SubmissionReceipt, ServiceError> {
        validation::validate_submission(&request, self.capacity)
            .map_err(|e| ServiceError::validation("Validation error", e))?;

        let seller_id = request.seller_id.clone();
        if !self.blocking(move |db| db::sellers::exists(db, &seller_id)).await? {
            return Err(ServiceError::NotFound("Seller"));
        }

        let invalid = validation::price_violations(&request.products);
        if !invalid.is_empty() {
            return Err(ServiceError::InvalidPrices(invalid));
        }

        let SubmitProductsRequest {
            seller_id,
            products,
        } = request;
        let created = self
            .blocking(move |db| db::products::insert_batch(db, &seller_id, &products))
            .await?;

        tracing::info!(count = created.len(), "Product batch submitted");
        Ok(SubmissionReceipt {
            message: PRODUCTS_CREATED.to_string(),
            count: created.len(),
            products: created,
        })
    }

    pub async fn list_products(&self, seller_id: String) -> Result<Vec<Product>, ServiceError> {
        if seller_id.trim().is_empty() {
            return Err(ServiceError::validation(
                "Invalid request",
                vec![FieldError::new("sellerId", "Seller ID is required")],
            ));
        }
        self.blocking(move |db| db::products::list_for_seller(db, &seller_id))
            .await
    }

    pub async fn delete_product(&self, id: String) -> Result<(), ServiceError> {
        let deleted = self
            .blocking(move |db| db::products::delete(db, &id))
            .await?;
        if deleted {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Product"))
        }
    }

    pub async fn dashboard(&self, query: DashboardQuery) -> Result<DashboardPage, ServiceError> {
        self.blocking(move |db| dashboard::page(db, &query, Utc::now()))
            .await
    }

    pub async fn analytics(&self, range: DateRange) -> Result<Analytics, ServiceError> {
        self.blocking(move |db| dashboard::analytics(db, range, Utc::now()))
            .await
    }
}
