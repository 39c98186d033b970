//! Application State
//!
//! Shared state for the namespace registry API server

use std::sync::Arc;

use crate::registry::{AccessPartitioner, NamespaceRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<NamespaceRegistry>,
    pub access: Arc<AccessPartitioner>,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(
        registry: Arc<NamespaceRegistry>,
        access: Arc<AccessPartitioner>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            access,
            jwt_secret: jwt_secret.into(),
        }
    }
}
