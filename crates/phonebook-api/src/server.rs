//! Server startup: wire store, cache, metrics and router, then serve.

use std::sync::Arc;

use phonebook_core::PhonebookError;
use phonebook_engine::{ContactService, ResponseCache, ServiceMetrics};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::router::build_router;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to open contact store: {0}")]
    Store(#[from] PhonebookError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Open the configured backend and assemble the service around it
///
/// # Errors
/// Fails when the store cannot be opened or migrated.
pub fn build_service(config: &ServerConfig) -> Result<ContactService, PhonebookError> {
    let store = config.backend.open()?;
    let service = ContactService::new(
        store,
        ResponseCache::new(config.cache_ttl),
        Arc::new(ServiceMetrics::new()),
    );
    service.warm_up()?;
    Ok(service)
}

/// Run the HTTP server until ctrl-c
///
/// # Errors
/// Fails when the store cannot be opened, the address cannot be bound, or the
/// server stops with an I/O error.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let service = tokio::task::block_in_place(|| build_service(&config))?;
    let app = build_router(AppState::shared(service));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "phonebook server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;
    tracing::info!("phonebook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
