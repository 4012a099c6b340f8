//! Shared application state

use std::sync::Arc;

use phonebook_engine::ContactService;

/// State handed to every handler
pub struct AppState {
    pub service: Arc<ContactService>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn shared(service: ContactService) -> SharedState {
        Arc::new(Self {
            service: Arc::new(service),
        })
    }
}
