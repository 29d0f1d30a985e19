use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Retail data viewer HTTP server.
pub struct RetailServer {
    config: ServerConfig,
}

impl RetailServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.config.seed_path.clone()))
    }

    /// Load the seed once, then start serving requests.
    ///
    /// A seed that cannot be read or parsed stops startup; issues found by
    /// validation are only logged.
    pub async fn serve(self) -> ServerResult<()> {
        let state = AppState::new(self.config.seed_path.clone());
        state
            .with_repository(|repo| {
                info!(
                    seed = %repo.seed_path().display(),
                    stores = repo.list_stores().len(),
                    products = repo.list_products().len(),
                    issues = repo.issues().len(),
                    "seed loaded"
                );
                Ok(())
            })
            .await?;

        let app = build_router(state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("retail data viewer listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
