//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::db::{
    Analytics, DailyCount, DashboardPage, DashboardStats, DateRange, Pagination, SellerOwner,
    SellerSummary, SortBy, SortOrder, TopUser,
};
use crate::models::{
    AuthRequest, CreateSellerRequest, FieldError, ImageFolder, NewProduct, Product, Seller,
    SubmissionReceipt, SubmitProductsRequest, UploadedImage, User,
};
use crate::rest::dto::{HealthResponse, MessageResponse, ProductList, UploadForm};
use crate::rest::error::ErrorResponse;
use crate::session::UserStats;

/// OpenAPI documentation for the lead capture REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadcollect API",
        description = "Seller onboarding and product lead capture: authentication, image hosting, sellers, product batches and dashboard.",
        license(name = "MIT")
    ),
    paths(
        crate::rest::routes::health::health,
        crate::rest::routes::auth::authenticate,
        crate::rest::routes::uploads::upload,
        crate::rest::routes::sellers::create,
        crate::rest::routes::products::submit,
        crate::rest::routes::products::list,
        crate::rest::routes::products::delete,
        crate::rest::routes::dashboard::dashboard,
        crate::rest::routes::dashboard::analytics,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            FieldError,
            MessageResponse,
            AuthRequest,
            User,
            UserStats,
            UploadForm,
            UploadedImage,
            ImageFolder,
            CreateSellerRequest,
            Seller,
            NewProduct,
            SubmitProductsRequest,
            SubmissionReceipt,
            Product,
            ProductList,
            DashboardPage,
            DashboardStats,
            SellerSummary,
            SellerOwner,
            Pagination,
            DateRange,
            SortBy,
            SortOrder,
            Analytics,
            DailyCount,
            TopUser,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Auth", description = "Phone-number authentication"),
        (name = "Uploads", description = "Image hosting"),
        (name = "Sellers", description = "Seller creation"),
        (name = "Products", description = "Batch product submission and management"),
        (name = "Dashboard", description = "Seller listing, stats and analytics"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }

    /// Generate the OpenAPI specification as a YAML string
    pub fn yaml() -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&Self::openapi())
    }
}
