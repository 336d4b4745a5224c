// ── Controller abstraction ──
//
// Host-facing façade over one UAI+ session. Speaks host positions
// (0 = closed, 100 = open), accepts node ids in either form, and turns
// transport failures into `CoreError`s.

use std::sync::Arc;

use somfly_api::telnet::ConnectionState;
use somfly_api::{Notification, NodeId, SessionRegistry, TelnetClient};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::convert::{device_from_host, host_from_device, percent_from_raw};
use crate::error::CoreError;
use crate::model::{HostPosition, Shade};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every controller built
/// from the same [`SessionRegistry`] and endpoint shares one Telnet socket.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: TelnetClient,
}

impl Controller {
    /// Controller with a private session. Does NOT connect: the first
    /// operation (or [`connect()`](Self::connect)) does.
    pub fn new(config: ControllerConfig) -> Self {
        let registry = SessionRegistry::new(config.transport());
        Self::with_registry(config, &registry)
    }

    /// Controller sharing sessions through `registry`.
    pub fn with_registry(config: ControllerConfig, registry: &SessionRegistry) -> Self {
        let client = registry.client(config.endpoint());
        Self {
            inner: Arc::new(ControllerInner { config, client }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// The underlying protocol client, for raw device-native access.
    pub fn client(&self) -> &TelnetClient {
        &self.inner.client
    }

    // ── Connection lifecycle ─────────────────────────────────────

    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .client
            .connection()
            .ensure_connected()
            .await
            .map_err(|e| self.core_error(e))?;
        info!(host = %self.inner.config.host, "connected to controller");
        Ok(())
    }

    pub async fn disconnect(&self) {
        self.inner.client.disconnect().await;
    }

    pub fn is_connected(&self) -> bool {
        self.inner.client.is_connected()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.client.subscribe_state()
    }

    /// Unsolicited controller frames, forwarded uninterpreted.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.client.notifications()
    }

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── Queries ──────────────────────────────────────────────────

    /// `true` if the controller answers a node scan.
    pub async fn ping(&self) -> Result<bool, CoreError> {
        self.inner.client.ping().await.map_err(|e| self.core_error(e))
    }

    /// Every shade with name, model, and host position.
    pub async fn shades(&self) -> Result<Vec<Shade>, CoreError> {
        let statuses = self
            .inner
            .client
            .shades()
            .await
            .map_err(|e| self.core_error(e))?;
        Ok(statuses.into_iter().map(Shade::from).collect())
    }

    /// One shade, looked up by id in either form.
    pub async fn shade(&self, node: &str) -> Result<Shade, CoreError> {
        let node = self.known_node(node).await?;
        let client = &self.inner.client;
        let (info, position) = tokio::join!(client.info(&node), client.position(&node));
        let info = info.map_err(|e| self.core_error(e))?;
        let position = position.map_err(|e| self.core_error(e))?;
        Ok(Shade {
            dotted_id: node.dotted(),
            node_id: node,
            name: info.name,
            kind: info.kind,
            position: host_from_device(position),
        })
    }

    /// Current host position of one shade.
    pub async fn position(&self, node: &str) -> Result<HostPosition, CoreError> {
        let node = parse_node(node)?;
        let position = self
            .inner
            .client
            .position(&node)
            .await
            .map_err(|e| self.core_error(e))?;
        Ok(host_from_device(position))
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Move to a host position (0 = closed, 100 = open).
    pub async fn set_position(&self, node: &str, position: HostPosition) -> Result<(), CoreError> {
        let node = parse_node(node)?;
        let device = device_from_host(position);
        debug!(node = %node, host = %position, device = %device, "set position");
        self.inner
            .client
            .move_to(&node, device)
            .await
            .map_err(|e| self.core_error(e))
    }

    /// Move to a raw motor position, scaled between the motor's limits.
    pub async fn set_position_raw(
        &self,
        node: &str,
        raw: i64,
        limits_up: i64,
        limits_down: i64,
    ) -> Result<(), CoreError> {
        let node = parse_node(node)?;
        let device = percent_from_raw(raw, limits_up, limits_down)?;
        debug!(node = %node, raw, limits_up, limits_down, device = %device, "set raw position");
        self.inner
            .client
            .move_to(&node, device)
            .await
            .map_err(|e| self.core_error(e))
    }

    /// Fully open (device "up").
    pub async fn open(&self, node: &str) -> Result<(), CoreError> {
        let node = parse_node(node)?;
        self.inner
            .client
            .move_up(&node)
            .await
            .map_err(|e| self.core_error(e))
    }

    /// Fully close (device "down").
    pub async fn close(&self, node: &str) -> Result<(), CoreError> {
        let node = parse_node(node)?;
        self.inner
            .client
            .move_down(&node)
            .await
            .map_err(|e| self.core_error(e))
    }

    pub async fn stop(&self, node: &str) -> Result<(), CoreError> {
        let node = parse_node(node)?;
        self.inner
            .client
            .move_stop(&node)
            .await
            .map_err(|e| self.core_error(e))
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn known_node(&self, node: &str) -> Result<NodeId, CoreError> {
        let node = parse_node(node)?;
        let known = self
            .inner
            .client
            .enumerate()
            .await
            .map_err(|e| self.core_error(e))?;
        if known.contains(&node) {
            Ok(node)
        } else {
            Err(CoreError::ShadeNotFound {
                identifier: node.dotted(),
            })
        }
    }

    /// Translate an API error, filling in the endpoint where the transport
    /// layer did not know it.
    fn core_error(&self, err: somfly_api::Error) -> CoreError {
        match CoreError::from(err) {
            CoreError::ConnectionFailed { endpoint, reason } if endpoint.is_empty() => {
                CoreError::ConnectionFailed {
                    endpoint: self.inner.client.endpoint().address(),
                    reason,
                }
            }
            other => other,
        }
    }
}

/// Accept `132A01` or `13.2A.01`.
pub fn parse_node(node: &str) -> Result<NodeId, CoreError> {
    node.parse::<NodeId>().map_err(CoreError::from)
}
