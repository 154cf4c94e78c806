//! The closed action vocabulary accepted by the session reducer.

use serde::{Deserialize, Serialize};

use super::error::SessionError;
use super::state::{ProductDraft, SellerDraft, Step, UserDraft};

/// Every tag the reducer understands, in wire form
pub const ACTION_TAGS: &[&str] = &[
    "SET_USER",
    "SET_SELLER",
    "ADD_PRODUCT",
    "UPDATE_PRODUCT",
    "REMOVE_PRODUCT",
    "SET_STEP",
    "SET_SUBMITTING",
    "RESET_FORM",
];

/// A session transition.
///
/// Wire form is `{"type": "SET_USER", "payload": {...}}`; `RESET_FORM`
/// carries no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetUser(UserDraft),
    SetSeller(SellerDraft),
    AddProduct(ProductDraft),
    UpdateProduct { index: usize, product: ProductDraft },
    RemoveProduct(usize),
    SetStep(Step),
    SetSubmitting(bool),
    ResetForm,
}

impl Action {
    /// Wire tag of this action
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetUser(_) => "SET_USER",
            Action::SetSeller(_) => "SET_SELLER",
            Action::AddProduct(_) => "ADD_PRODUCT",
            Action::UpdateProduct { .. } => "UPDATE_PRODUCT",
            Action::RemoveProduct(_) => "REMOVE_PRODUCT",
            Action::SetStep(_) => "SET_STEP",
            Action::SetSubmitting(_) => "SET_SUBMITTING",
            Action::ResetForm => "RESET_FORM",
        }
    }

    /// Parse a tagged JSON action.
    ///
    /// A tag outside [`ACTION_TAGS`] fails fast with `UnknownAction` instead of
    /// being ignored.
    pub fn parse(json: &str) -> Result<Action, SessionError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SessionError::MalformedAction {
                action: "<unparsed>".to_string(),
                reason: e.to_string(),
            })?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Action, SessionError> {
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| SessionError::MalformedAction {
                action: "<missing>".to_string(),
                reason: "action has no string 'type' field".to_string(),
            })?
            .to_string();

        if !ACTION_TAGS.contains(&tag.as_str()) {
            return Err(SessionError::UnknownAction(tag));
        }

        serde_json::from_value(value).map_err(|e| SessionError::MalformedAction {
            action: tag,
            reason: e.to_string(),
        })
    }
}
