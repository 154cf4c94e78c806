//! Field validation for collaborator requests.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthRequest, CreateSellerRequest, ImageFile, NewProduct, SubmitProductsRequest};
use crate::session::Capacity;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+]?[\s0-9]+)?(\d{3}|[(]?[0-9]+[)])?([-]?[\s]?[0-9])+$")
        .unwrap_or_else(|e| panic!("invalid phone pattern: {}", e))
});

static GST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$")
        .unwrap_or_else(|e| panic!("invalid GST pattern: {}", e))
});

pub const PHONE_LENGTH: usize = 10;
pub const GST_LENGTH: usize = 15;

/// A validation failure on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join errors into a single human readable line
pub fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_name(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len < 2 {
        errors.push(FieldError::new(field, "must be at least 2 characters"));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("cannot exceed {} characters", max),
        ));
    }
}

fn check_phone(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if !PHONE_RE.is_match(value) {
        errors.push(FieldError::new(field, "invalid phone number"));
    } else if value.chars().count() != PHONE_LENGTH {
        errors.push(FieldError::new(
            field,
            format!("must be exactly {} digits", PHONE_LENGTH),
        ));
    }
}

fn check_url(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    let valid = reqwest::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(FieldError::new(field, "must be an http(s) URL"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_auth(request: &AuthRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_name(&mut errors, "name", &request.name, 50);
    check_phone(&mut errors, "phone", &request.phone);
    finish(errors)
}

pub fn validate_seller(request: &CreateSellerRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_name(&mut errors, "name", &request.name, 50);
    check_phone(&mut errors, "phone", &request.phone);

    if request.gst_number.chars().count() != GST_LENGTH {
        errors.push(FieldError::new(
            "gstNumber",
            format!("must be exactly {} characters", GST_LENGTH),
        ));
    } else if !GST_RE.is_match(&request.gst_number) {
        errors.push(FieldError::new("gstNumber", "invalid GST number format"));
    }

    check_url(&mut errors, "shopImage", &request.shop_image);
    if request.user_id.trim().is_empty() {
        errors.push(FieldError::new("userId", "is required"));
    }
    finish(errors)
}

/// Field checks for a single product, with fields prefixed by `prefix`
pub fn validate_product(prefix: &str, product: &NewProduct) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    let field = |name: &str| format!("{}{}", prefix, name);

    check_name(&mut errors, &field("name"), &product.name, 100);
    if !product.mrp.is_finite() || product.mrp < 1.0 {
        errors.push(FieldError::new(field("mrp"), "must be at least 1"));
    }
    if !product.msp.is_finite() || product.msp < 1.0 {
        errors.push(FieldError::new(field("msp"), "must be at least 1"));
    }
    check_url(&mut errors, &field("frontImage"), &product.front_image);
    check_url(&mut errors, &field("sideImage"), &product.side_image);
    check_url(&mut errors, &field("backImage"), &product.back_image);
    finish(errors)
}

/// Shape checks for a batch submission: seller id, count bounds, per-item fields.
///
/// Price ordering (`msp <= mrp`) is checked separately by
/// [`price_violations`] so it can be reported with the offending names.
pub fn validate_submission(
    request: &SubmitProductsRequest,
    capacity: Capacity,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if request.seller_id.trim().is_empty() {
        errors.push(FieldError::new("sellerId", "Seller ID is required"));
    }

    let count = request.products.len();
    if count < capacity.minimum() {
        errors.push(FieldError::new(
            "products",
            format!("Minimum {} products required", capacity.minimum()),
        ));
    } else if count > capacity.maximum() {
        errors.push(FieldError::new(
            "products",
            format!("Maximum {} products allowed", capacity.maximum()),
        ));
    }

    for (i, product) in request.products.iter().enumerate() {
        if let Err(mut item_errors) = validate_product(&format!("products[{}].", i), product) {
            errors.append(&mut item_errors);
        }
    }
    finish(errors)
}

/// Names of products whose MSP exceeds their MRP
pub fn price_violations(products: &[NewProduct]) -> Vec<String> {
    products
        .iter()
        .filter(|p| p.msp > p.mrp)
        .map(|p| p.name.clone())
        .collect()
}

/// Content type and size checks for an upload
pub fn validate_image(
    image: &ImageFile,
    allowed_types: &[String],
    max_file_size: u64,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if image.bytes.is_empty() {
        errors.push(FieldError::new("file", "image is required"));
    }
    if image.bytes.len() as u64 > max_file_size {
        errors.push(FieldError::new(
            "file",
            format!(
                "File size should be less than {}MB",
                max_file_size / (1024 * 1024)
            ),
        ));
    }
    if !allowed_types.iter().any(|t| t == &image.content_type) {
        errors.push(FieldError::new(
            "file",
            format!("Only {} files are allowed", allowed_types.join(", ")),
        ));
    }
    finish(errors)
}
