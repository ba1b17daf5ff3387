//! Shared application state for all routes. Holds handles only; entity state lives in the store.

use crate::error::ConfigError;
use crate::gateway::Gateway;
use crate::managers::Managers;
use crate::store::EntityStore;
use crate::token::TokenIssuer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub managers: Arc<Managers>,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Build managers and the dispatch registry once, at startup.
    pub fn new(store: Arc<dyn EntityStore>, tokens: Arc<dyn TokenIssuer>) -> Result<Self, ConfigError> {
        let managers = Arc::new(Managers::new(store.clone(), tokens));
        let gateway = Arc::new(Gateway::standard(managers.clone())?);
        Ok(AppState {
            store,
            managers,
            gateway,
        })
    }
}
