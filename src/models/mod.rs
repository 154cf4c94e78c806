//! Server-side records and collaborator request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::session::{ProductDraft, SellerDraft, UserDraft, UserStats};

pub mod validation;

pub use validation::FieldError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stats: UserStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub gst_number: String,
    pub shop_image: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub mrp: f64,
    pub msp: f64,
    pub front_image: String,
    pub side_image: String,
    pub back_image: String,
    pub seller_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credentials for the authentication collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSellerRequest {
    pub name: String,
    pub phone: String,
    pub gst_number: String,
    /// Hosted URL of the shop image
    pub shop_image: String,
    pub user_id: String,
}

/// One product in a batch submission. Images are already hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub mrp: f64,
    pub msp: f64,
    pub front_image: String,
    pub side_image: String,
    pub back_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProductsRequest {
    pub seller_id: String,
    pub products: Vec<NewProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionReceipt {
    pub message: String,
    pub count: usize,
    pub products: Vec<Product>,
}

/// Folder an uploaded image is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFolder {
    Shops,
    Products,
}

impl ImageFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFolder::Shops => "shops",
            ImageFolder::Products => "products",
        }
    }

    pub fn parse(value: &str) -> Option<ImageFolder> {
        match value {
            "shops" => Some(ImageFolder::Shops),
            "products" => Some(ImageFolder::Products),
            _ => None,
        }
    }
}

/// Raw image bytes awaiting upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Guess the content type from the file extension
    pub fn content_type_for(file_name: &str) -> &'static str {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        }
    }

    /// Read an image from disk
    pub fn read(path: &std::path::Path) -> std::io::Result<ImageFile> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        Ok(ImageFile {
            content_type: Self::content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Response from the image upload collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadedImage {
    pub url: String,
}

impl From<&User> for UserDraft {
    fn from(user: &User) -> Self {
        UserDraft {
            id: Some(user.id.clone()),
            name: Some(user.name.clone()),
            phone: Some(user.phone.clone()),
            stats: Some(user.stats),
        }
    }
}

impl From<&Seller> for SellerDraft {
    fn from(seller: &Seller) -> Self {
        SellerDraft {
            id: Some(seller.id.clone()),
            name: Some(seller.name.clone()),
            phone: Some(seller.phone.clone()),
            gst_number: Some(seller.gst_number.clone()),
            shop_image: Some(seller.shop_image.clone()),
            user_id: Some(seller.user_id.clone()),
        }
    }
}

impl From<&NewProduct> for ProductDraft {
    fn from(product: &NewProduct) -> Self {
        ProductDraft {
            name: Some(product.name.clone()),
            mrp: Some(product.mrp),
            msp: Some(product.msp),
            front_image: Some(product.front_image.clone()),
            side_image: Some(product.side_image.clone()),
            back_image: Some(product.back_image.clone()),
        }
    }
}

impl TryFrom<&ProductDraft> for NewProduct {
    type Error = Vec<FieldError>;

    /// A draft is submittable once every field is filled in
    fn try_from(draft: &ProductDraft) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();
        let mut require = |field: &str, present: bool| {
            if !present {
                errors.push(FieldError::new(field, "is required"));
            }
        };
        require("name", draft.name.is_some());
        require("mrp", draft.mrp.is_some());
        require("msp", draft.msp.is_some());
        require("frontImage", draft.front_image.is_some());
        require("sideImage", draft.side_image.is_some());
        require("backImage", draft.back_image.is_some());

        match (
            &draft.name,
            draft.mrp,
            draft.msp,
            &draft.front_image,
            &draft.side_image,
            &draft.back_image,
        ) {
            (Some(name), Some(mrp), Some(msp), Some(front), Some(side), Some(back)) => {
                Ok(NewProduct {
                    name: name.clone(),
                    mrp,
                    msp,
                    front_image: front.clone(),
                    side_image: side.clone(),
                    back_image: back.clone(),
                })
            }
            _ => Err(errors),
        }
    }
}
