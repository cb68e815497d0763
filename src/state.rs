//! Shared application state for all routes.

use crate::service::ListService;
use crate::store::ListStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub lists: ListService,
}

impl AppState {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self {
            lists: ListService::new(store),
        }
    }
}
