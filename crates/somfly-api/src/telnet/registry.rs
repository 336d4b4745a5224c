// Per-endpoint session sharing
//
// Handles built from one registry for the same endpoint identity share one
// `Connection`, so there is never more than one socket per identity. The
// first handle for an identity creates the connection; later ones join it.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;
use tracing::debug;

use super::client::TelnetClient;
use super::connection::Connection;
use crate::auth::{Endpoint, EndpointKey};
use crate::transport::TransportConfig;

/// Explicit replacement for a process-wide connection cache.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<EndpointKey, Connection>>,
    config: TransportConfig,
}

impl SessionRegistry {
    /// Registry whose connections all use `config`.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config,
        }
    }

    /// A client for `endpoint`, sharing any existing session for it.
    pub fn client(&self, endpoint: Endpoint) -> TelnetClient {
        TelnetClient::from_connection(self.connection(endpoint))
    }

    /// The shared connection for `endpoint`, created on first use.
    pub fn connection(&self, endpoint: Endpoint) -> Connection {
        self.sessions
            .entry(endpoint.key())
            .or_insert_with(|| {
                debug!(endpoint = %endpoint, "registering telnet endpoint");
                Connection::new(endpoint, self.config.clone())
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every session. Connections stay registered and reconnect on
    /// their next request.
    pub async fn disconnect_all(&self) {
        let connections: Vec<Connection> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        join_all(connections.iter().map(Connection::disconnect)).await;
    }
}
