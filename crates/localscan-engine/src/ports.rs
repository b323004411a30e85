//! Ephemeral port selection for the engine.

use crate::traits::ConfigStore;
use localscan_core::{LocalScanError, Result};
use std::net::{Ipv4Addr, TcpListener};
use std::sync::Arc;
use tracing::{debug, warn};

/// Picks a free loopback port and remembers it under the engine's config key
#[derive(Clone)]
pub struct PortAllocator {
    store: Arc<dyn ConfigStore>,
    key: String,
}

impl std::fmt::Debug for PortAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortAllocator").field("key", &self.key).finish_non_exhaustive()
    }
}

impl PortAllocator {
    /// Allocator persisting under `key`
    pub fn new(store: Arc<dyn ConfigStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Previously persisted port, if it parses
    #[must_use]
    pub fn configured_port(&self) -> Option<u16> {
        self.store
            .get(&self.key)
            .and_then(|value| value.trim().parse().ok())
            .filter(|port| *port != 0)
    }

    /// Find a free port and persist it.
    ///
    /// The socket is released before returning, so another process could in
    /// principle take the port before the engine binds it. Persistence
    /// failures are logged and otherwise ignored.
    pub fn find_port(&self) -> Result<u16> {
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
                .map_err(|e| LocalScanError::PortAllocation(e.to_string()))?;
            listener
                .local_addr()
                .map_err(|e| LocalScanError::PortAllocation(e.to_string()))?
                .port()
        };

        if let Err(e) = self.store.set(&self.key, &port.to_string()) {
            warn!(key = %self.key, port, error = %e, "failed to persist engine port");
        } else {
            debug!(key = %self.key, port, "persisted engine port");
        }

        Ok(port)
    }
}
