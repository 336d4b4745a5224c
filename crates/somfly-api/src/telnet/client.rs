// Telnet client handle
//
// Cheap to clone. Shade operations live in `shades.rs`; this file carries
// construction and the session controls.

use serde_json::Value;
use tokio::sync::{broadcast, watch};

use super::connection::{Connection, ConnectionState};
use super::rpc::{Method, Notification, RpcResult};
use crate::auth::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Client for one UAI+ controller over JSON-RPC/Telnet.
///
/// Build it through a [`SessionRegistry`](super::SessionRegistry) to share
/// the socket with every other client for the same endpoint, or with
/// [`new`](Self::new) for a private session.
#[derive(Debug, Clone)]
pub struct TelnetClient {
    connection: Connection,
}

impl TelnetClient {
    /// A client with its own, unshared session.
    pub fn new(endpoint: Endpoint, config: TransportConfig) -> Self {
        Self::from_connection(Connection::new(endpoint, config))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.connection.endpoint()
    }

    pub async fn connect(&self) -> Result<(), Error> {
        self.connection.connect().await
    }

    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe_state()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.connection.notifications()
    }

    /// Issue a raw request. Prefer the typed shade operations.
    pub async fn call(&self, method: Method, params: Vec<Value>) -> Result<RpcResult, Error> {
        self.connection.call(method, params).await
    }
}
