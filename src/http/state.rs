use std::sync::Arc;

use crate::store::Store;

/// Shared handler state. Cloned per request by the router.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
