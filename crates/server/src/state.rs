use std::sync::Arc;

use store::{KvStore, StoreHandle};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn KvStore>,
}

impl ServerState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn from_handle(handle: StoreHandle) -> Self {
        Self::new(Arc::new(handle))
    }
}
