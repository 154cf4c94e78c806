//! Data Transfer Objects for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::dashboard::MAX_PAGE_SIZE;
use crate::db::{DashboardQuery, DateRange};
use crate::models::{FieldError, Product};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Multipart body for image uploads
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Image file (jpeg, png or webp)
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductList {
    pub count: usize,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductListParams {
    pub seller_id: Option<String>,
}

/// Raw dashboard query parameters, validated by [`DashboardParams::into_query`]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct DashboardParams {
    /// today, week, month or all
    pub date_range: Option<String>,
    /// date, products or name
    pub sort_by: Option<String>,
    /// asc or desc (default desc)
    pub sort_order: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Page size, 1-100
    pub limit: Option<String>,
}

fn parse_field<T: std::str::FromStr<Err = String>>(
    errors: &mut Vec<FieldError>,
    field: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    match raw {
        None | Some("") => default,
        Some(value) => value.parse().unwrap_or_else(|e| {
            errors.push(FieldError::new(field, e));
            default
        }),
    }
}

fn parse_number(errors: &mut Vec<FieldError>, field: &str, raw: Option<&str>, default: u32, max: u32) -> u32 {
    match raw {
        None | Some("") => default,
        Some(value) => match value.parse::<u32>() {
            Ok(n) if (1..=max).contains(&n) => n,
            _ => {
                errors.push(FieldError::new(
                    field,
                    format!("must be an integer between 1 and {}", max),
                ));
                default
            }
        },
    }
}

impl DashboardParams {
    pub fn into_query(self) -> Result<DashboardQuery, Vec<FieldError>> {
        let mut errors = Vec::new();
        let defaults = DashboardQuery::default();
        let query = DashboardQuery {
            date_range: parse_field(&mut errors, "dateRange", self.date_range.as_deref(), defaults.date_range),
            sort_by: parse_field(&mut errors, "sortBy", self.sort_by.as_deref(), defaults.sort_by),
            sort_order: parse_field(&mut errors, "sortOrder", self.sort_order.as_deref(), defaults.sort_order),
            page: parse_number(&mut errors, "page", self.page.as_deref(), defaults.page, u32::MAX),
            limit: parse_number(&mut errors, "limit", self.limit.as_deref(), defaults.limit, MAX_PAGE_SIZE),
        };
        if errors.is_empty() {
            Ok(query)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AnalyticsParams {
    /// today, week, month or all
    pub date_range: Option<String>,
}

impl AnalyticsParams {
    pub fn into_range(self) -> Result<DateRange, Vec<FieldError>> {
        let mut errors = Vec::new();
        let range = parse_field(&mut errors, "dateRange", self.date_range.as_deref(), DateRange::All);
        if errors.is_empty() {
            Ok(range)
        } else {
            Err(errors)
        }
    }
}
