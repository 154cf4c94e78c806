//! API state management for the REST server.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db::Database;
use crate::services::LeadService;
use crate::uploads::LocalImageStore;

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    pub service: LeadService,
    pub config: Arc<Config>,
}

impl ApiState {
    pub fn new(config: Config, service: LeadService) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Open the database and image store named by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let service = build_service(&config)?;
        Ok(Self::new(config, service))
    }

    /// Request body ceiling for uploads: the file limit plus room for multipart framing
    pub fn upload_body_limit(&self) -> usize {
        usize::try_from(self.config.uploads.max_file_size)
            .unwrap_or(usize::MAX)
            .saturating_add(64 * 1024)
    }
}

/// Build a `LeadService` over the configured database and uploads directory
pub fn build_service(config: &Config) -> Result<LeadService> {
    let capacity = config.capacity().context("Invalid product capacity")?;
    let db = Database::open(config.database_path()).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path().display()
        )
    })?;
    let images = LocalImageStore::from_config(config);
    Ok(LeadService::new(db, Arc::new(images), capacity))
}
