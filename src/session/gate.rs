//! Navigation and submission permission derived from session state.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::capacity::Capacity;
use super::state::{SessionState, Step};

/// Destinations the wizard can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The entry (authentication) page
    Home,
    AddSeller,
    AddProducts,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::AddSeller => "/add-seller",
            Route::AddProducts => "/add-products",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Gated routes require an authenticated session
    pub fn is_gated(self) -> bool {
        matches!(self, Route::AddSeller | Route::AddProducts)
    }

    /// Route that renders a wizard step
    pub fn for_step(step: Step) -> Route {
        match step {
            Step::Auth => Route::Home,
            Step::Seller => Route::AddSeller,
            Step::Products => Route::AddProducts,
        }
    }

    /// Match a request path, including nested paths under a gated prefix
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Route::Home);
        }
        [Route::AddSeller, Route::AddProducts, Route::Dashboard]
            .into_iter()
            .find(|route| {
                trimmed == route.path() || trimmed.starts_with(&format!("{}/", route.path()))
            })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_path(s).ok_or_else(|| format!("unknown route '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    RedirectToEntry,
}

/// Why a batch submission cannot proceed yet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionBlocked {
    #[error("sign in before submitting products")]
    NotAuthenticated,

    #[error("add a seller before submitting products")]
    MissingSeller,

    #[error("not enough products: {have} added, at least {minimum} required")]
    NotEnoughProducts { have: usize, minimum: usize },

    #[error("too many products: {have} added, at most {maximum} allowed")]
    TooManyProducts { have: usize, maximum: usize },
}

/// A user is present and has a server-assigned identity
pub fn is_authenticated(state: &SessionState) -> bool {
    state.user_id().is_some_and(|id| !id.is_empty())
}

/// Decide whether navigating to `route` is permitted
pub fn check_route(state: &SessionState, route: Route) -> Navigation {
    if route.is_gated() && !is_authenticated(state) {
        Navigation::RedirectToEntry
    } else {
        Navigation::Allow
    }
}

/// Where the wizard should land given the current state
pub fn resolve_route(state: &SessionState) -> Route {
    let wanted = Route::for_step(state.current_step);
    match check_route(state, wanted) {
        Navigation::Allow => wanted,
        Navigation::RedirectToEntry => Route::Home,
    }
}

/// Business readiness check for the batch submission
pub fn check_submission(state: &SessionState, capacity: Capacity) -> Result<(), SubmissionBlocked> {
    if !is_authenticated(state) {
        return Err(SubmissionBlocked::NotAuthenticated);
    }
    if state.seller_id().is_none() {
        return Err(SubmissionBlocked::MissingSeller);
    }

    let have = state.products.len();
    if have < capacity.minimum() {
        return Err(SubmissionBlocked::NotEnoughProducts {
            have,
            minimum: capacity.minimum(),
        });
    }
    if have > capacity.maximum() {
        return Err(SubmissionBlocked::TooManyProducts {
            have,
            maximum: capacity.maximum(),
        });
    }
    Ok(())
}
