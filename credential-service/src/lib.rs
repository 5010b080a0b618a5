//! Credential lifecycle for back-office accounts.
//!
//! Two entry points, both on [`services::CredentialService`]:
//! invited-account activation (`set_invited_user_password`) and password
//! changes including administrator resets (`change_password`). Transport is
//! left to the caller; errors convert into [`service_core::error::AppError`].

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::sync::Arc;

use crate::config::CredentialConfig;
use crate::services::{CredentialService, TokenExpirySession};

/// Install logging (and OTLP export when configured) for this service.
pub fn init_observability(config: &CredentialConfig) -> Result<(), AppError> {
    init_tracing(
        &config.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )
}

/// Connect to PostgreSQL and wire a service backed by it.
pub async fn build_service(config: &CredentialConfig) -> Result<CredentialService, AppError> {
    let db = db::connect(&config.database)
        .await?
        .with_history_retention(config.password_policy.history_depth);
    db.health_check().await?;
    let db = Arc::new(db);

    tracing::info!(
        service = %config.service_name,
        environment = ?config.environment,
        history_depth = config.password_policy.history_depth,
        "Credential service initialized"
    );

    Ok(CredentialService::from_config(
        config,
        db.clone(),
        db,
        Arc::new(TokenExpirySession),
    ))
}
