//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{PurchaseOrderService, ReferenceService, TokenService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Built once at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the session token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Deadline applied to each service call.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.inner.config.request_timeout
    }

    #[must_use]
    pub fn purchase_orders(&self) -> PurchaseOrderService<'_> {
        PurchaseOrderService::new(self.pool(), self.request_timeout())
    }

    #[must_use]
    pub fn reference(&self) -> ReferenceService<'_> {
        ReferenceService::new(self.pool(), self.request_timeout())
    }
}
