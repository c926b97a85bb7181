//! API module for the clip catalog
//!
//! JSON over HTTP binding for sync, preview and selective sync.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::sync::SyncService;

pub mod handlers;
pub mod models;
pub mod server;

/// API Server for handling REST requests
pub struct ApiServer {
    service: Arc<SyncService>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(service: Arc<SyncService>, host: impl Into<String>, port: u16) -> Self {
        Self {
            service,
            host: host.into(),
            port,
        }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);
        server::start_http_server(self.service, &self.host, self.port).await
    }
}
