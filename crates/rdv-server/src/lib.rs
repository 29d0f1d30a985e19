//! HTTP server for the retail data viewer.
//!
//! Serves the seed repository as JSON under `/v1`. Form checks run in the
//! handlers; everything else is delegated to [`rdv_store::DataRepository`].

pub mod config;
pub mod error;
pub mod forms;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::RetailServer;
pub use state::AppState;
