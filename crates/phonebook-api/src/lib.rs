//! Phonebook API - HTTP/JSON surface of the phonebook service
//!
//! Routes live under `/api/contacts`; every handler delegates to the
//! `ContactService` on tokio's blocking pool.

pub mod config;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;
pub mod utils;

pub use config::{Cli, ServerConfig};
pub use router::build_router;
pub use state::{AppState, SharedState};
