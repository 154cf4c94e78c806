//! Session state carried across the three wizard steps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wizard step. Transitions are caller-directed, never derived from other fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Auth,
    Seller,
    Products,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Auth => "auth",
            Step::Seller => "seller",
            Step::Products => "products",
        }
    }

    pub fn all() -> &'static [Step] {
        &[Step::Auth, Step::Seller, Step::Products]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(Step::Auth),
            "seller" => Ok(Step::Seller),
            "products" => Ok(Step::Products),
            other => Err(format!("unknown step '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_sellers: u64,
    pub total_products: u64,
    /// Epoch millis of the user's latest activity
    pub last_active: i64,
}

/// Partial user record held by the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
}

impl UserDraft {
    /// Shallow merge: fields present in `patch` win.
    pub fn merged(&self, patch: UserDraft) -> UserDraft {
        UserDraft {
            id: patch.id.or_else(|| self.id.clone()),
            name: patch.name.or_else(|| self.name.clone()),
            phone: patch.phone.or_else(|| self.phone.clone()),
            stats: patch.stats.or(self.stats),
        }
    }
}

/// Partial seller record held by the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SellerDraft {
    /// Shallow merge: fields present in `patch` win.
    pub fn merged(&self, patch: SellerDraft) -> SellerDraft {
        SellerDraft {
            id: patch.id.or_else(|| self.id.clone()),
            name: patch.name.or_else(|| self.name.clone()),
            phone: patch.phone.or_else(|| self.phone.clone()),
            gst_number: patch.gst_number.or_else(|| self.gst_number.clone()),
            shop_image: patch.shop_image.or_else(|| self.shop_image.clone()),
            user_id: patch.user_id.or_else(|| self.user_id.clone()),
        }
    }
}

/// Partial product record. No identity until the server assigns one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub user: Option<UserDraft>,
    #[serde(default)]
    pub seller: Option<SellerDraft>,
    #[serde(default)]
    pub products: Vec<ProductDraft>,
    #[serde(default)]
    pub current_step: Step,
    #[serde(default)]
    pub is_submitting: bool,
}

impl SessionState {
    /// The initial empty state
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.id.as_deref())
    }

    pub fn seller_id(&self) -> Option<&str> {
        self.seller.as_ref().and_then(|s| s.id.as_deref())
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}
