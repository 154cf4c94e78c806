//! The owning caller of a [`FormSession`].
//!
//! Each wizard operation calls a collaborator and, on success, dispatches the
//! matching actions. `isSubmitting` is set only by [`Wizard::submit`] and is
//! held by a [`SubmitGuard`] across the batch call, so it is cleared whether
//! the call succeeds, fails or is cancelled by dropping the future.

use thiserror::Error;

use crate::client::{Backend, BackendError};
use crate::models::validation::summarize;
use crate::models::{
    AuthRequest, CreateSellerRequest, FieldError, ImageFile, ImageFolder, NewProduct,
    SubmissionReceipt, SubmitProductsRequest,
};
use crate::session::{
    Action, Capacity, FormSession, KeyValueStore, ProductDraft, SellerDraft,
    SessionError, SessionState, Step, SubmissionBlocked, UserDraft,
};

#[derive(Error, Debug)]
pub enum WizardError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Blocked(#[from] SubmissionBlocked),

    #[error("sign in first")]
    NotAuthenticated,

    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error("invalid input: {}", summarize(.0))]
    Invalid(Vec<FieldError>),
}

/// Seller details as entered, with the shop image still local
#[derive(Debug, Clone)]
pub struct SellerForm {
    pub name: String,
    pub phone: String,
    pub gst_number: String,
    pub shop_image: ImageFile,
}

/// Product details as entered, with the three images still local
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub mrp: f64,
    pub msp: f64,
    pub front_image: ImageFile,
    pub side_image: ImageFile,
    pub back_image: ImageFile,
}

impl ProductForm {
    fn check_prices(&self) -> Result<(), WizardError> {
        let mut errors = Vec::new();
        if !self.mrp.is_finite() || self.mrp < 1.0 {
            errors.push(FieldError::new("mrp", "must be at least 1"));
        }
        if !self.msp.is_finite() || self.msp < 1.0 {
            errors.push(FieldError::new("msp", "must be at least 1"));
        }
        if errors.is_empty() && self.msp > self.mrp {
            errors.push(FieldError::new("msp", "MSP cannot be greater than MRP"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Invalid(errors))
        }
    }
}

/// Holds `isSubmitting` for one batch call.
///
/// Dropped while still armed (an error before the outcome is recorded, or the
/// submit future being cancelled) it clears the flag itself.
struct SubmitGuard<'a, K: KeyValueStore> {
    session: &'a mut FormSession<K>,
    armed: bool,
}

impl<'a, K: KeyValueStore> SubmitGuard<'a, K> {
    fn arm(session: &'a mut FormSession<K>) -> Result<Self, SessionError> {
        session.dispatch(Action::SetSubmitting(true))?;
        Ok(Self {
            session,
            armed: true,
        })
    }

    /// The batch was accepted; the form starts over
    fn complete(mut self) -> Result<(), SessionError> {
        self.session.dispatch(Action::ResetForm)?;
        self.armed = false;
        Ok(())
    }

    /// The batch was rejected; keep the form for another attempt
    fn release(mut self) -> Result<(), SessionError> {
        self.session.dispatch(Action::SetSubmitting(false))?;
        self.armed = false;
        Ok(())
    }
}

impl<K: KeyValueStore> Drop for SubmitGuard<'_, K> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("Submission abandoned, clearing submission flag");
        if let Err(err) = self.session.dispatch(Action::SetSubmitting(false)) {
            tracing::error!(error = %err, "Failed to clear submission flag");
        }
    }
}

pub struct Wizard<B: Backend, K: KeyValueStore> {
    session: FormSession<K>,
    backend: B,
}

impl<B: Backend, K: KeyValueStore> Wizard<B, K> {
    /// Open the persisted session. A stored in-flight submission cannot have
    /// survived a restart, so its flag is cleared.
    pub fn open(backend: B, store: K, capacity: Capacity) -> Result<Self, WizardError> {
        let (mut session, _) = FormSession::open(store, capacity)?;
        if session.state().is_submitting {
            tracing::warn!("Clearing stale submission flag from a previous run");
            session.dispatch(Action::SetSubmitting(false))?;
        }
        Ok(Self { session, backend })
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &FormSession<K> {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn capacity(&self) -> Capacity {
        self.session.capacity()
    }

    pub async fn authenticate(&mut self, name: &str, phone: &str) -> Result<UserDraft, WizardError> {
        let request = AuthRequest {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
        };
        let user = self.backend.authenticate(&request).await?;
        tracing::info!(user_id = %user.id, "Authenticated");

        let draft = UserDraft::from(&user);
        self.session.dispatch(Action::SetUser(draft.clone()))?;
        self.session.dispatch(Action::SetStep(Step::Seller))?;
        Ok(draft)
    }

    pub async fn create_seller(&mut self, form: SellerForm) -> Result<SellerDraft, WizardError> {
        let user_id = self
            .state()
            .user_id()
            .filter(|_| self.session.is_authenticated())
            .map(str::to_string)
            .ok_or(WizardError::NotAuthenticated)?;

        let shop_image = self
            .backend
            .upload_image(ImageFolder::Shops, form.shop_image)
            .await?;
        let request = CreateSellerRequest {
            name: form.name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            gst_number: form.gst_number.trim().to_ascii_uppercase(),
            shop_image,
            user_id,
        };
        let seller = self.backend.create_seller(&request).await?;
        tracing::info!(seller_id = %seller.id, "Seller created");

        let draft = SellerDraft::from(&seller);
        self.session.dispatch(Action::SetSeller(draft.clone()))?;
        self.session.dispatch(Action::SetStep(Step::Products))?;
        Ok(draft)
    }

    pub async fn add_product(&mut self, form: ProductForm) -> Result<usize, WizardError> {
        if !self.session.is_authenticated() {
            return Err(WizardError::NotAuthenticated);
        }
        if !self.capacity().can_add(self.state().products.len()) {
            return Err(SessionError::CapacityExceeded {
                maximum: self.capacity().maximum(),
            }
            .into());
        }
        form.check_prices()?;

        let draft = self.host_product(form).await?;
        self.session.dispatch(Action::AddProduct(draft))?;
        Ok(self.state().products.len() - 1)
    }

    pub async fn update_product(
        &mut self,
        index: usize,
        form: ProductForm,
    ) -> Result<(), WizardError> {
        if !self.session.is_authenticated() {
            return Err(WizardError::NotAuthenticated);
        }
        let len = self.state().products.len();
        if index >= len {
            return Err(SessionError::InvalidIndex { index, len }.into());
        }
        form.check_prices()?;

        let product = self.host_product(form).await?;
        self.session
            .dispatch(Action::UpdateProduct { index, product })?;
        Ok(())
    }

    pub fn remove_product(&mut self, index: usize) -> Result<(), WizardError> {
        self.session.dispatch(Action::RemoveProduct(index))?;
        Ok(())
    }

    /// Submit the accumulated products as one batch.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, WizardError> {
        if self.state().is_submitting {
            return Err(WizardError::AlreadySubmitting);
        }
        self.session.check_submission()?;
        let request = self.submission_request()?;

        let guard = SubmitGuard::arm(&mut self.session)?;
        match self.backend.submit_products(&request).await {
            Ok(receipt) => {
                tracing::info!(count = receipt.count, "Products submitted");
                guard.complete()?;
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Submission failed");
                guard.release()?;
                Err(err.into())
            }
        }
    }

    pub fn reset(&mut self) -> Result<(), WizardError> {
        self.session.reset()?;
        Ok(())
    }

    fn submission_request(&self) -> Result<SubmitProductsRequest, WizardError> {
        let state = self.state();
        let seller_id = state
            .seller_id()
            .ok_or(WizardError::Blocked(SubmissionBlocked::MissingSeller))?;

        let mut errors = Vec::new();
        let mut products = Vec::with_capacity(state.products.len());
        for (i, draft) in state.products.iter().enumerate() {
            match NewProduct::try_from(draft) {
                Ok(product) => products.push(product),
                Err(item_errors) => errors.extend(item_errors.into_iter().map(|e| {
                    FieldError::new(format!("products[{}].{}", i, e.field), e.message)
                })),
            }
        }
        if !errors.is_empty() {
            return Err(WizardError::Invalid(errors));
        }

        Ok(SubmitProductsRequest {
            seller_id: seller_id.to_string(),
            products,
        })
    }

    async fn host_product(&self, form: ProductForm) -> Result<ProductDraft, WizardError> {
        let front = self
            .backend
            .upload_image(ImageFolder::Products, form.front_image)
            .await?;
        let side = self
            .backend
            .upload_image(ImageFolder::Products, form.side_image)
            .await?;
        let back = self
            .backend
            .upload_image(ImageFolder::Products, form.back_image)
            .await?;

        Ok(ProductDraft {
            name: Some(form.name.trim().to_string()),
            mrp: Some(form.mrp),
            msp: Some(form.msp),
            front_image: Some(front),
            side_image: Some(side),
            back_image: Some(back),
        })
    }
}
