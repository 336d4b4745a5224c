// Telnet session lifecycle
//
// A `Connection` owns at most one logged-in socket for its endpoint plus
// the reader and sender tasks that service it. Every request routes
// through `call`, which connects on demand. Only connect and disconnect
// take the session lock; requests never do.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::correlator::{Correlator, Reply};
use super::handshake;
use super::reader::{self, ReaderContext};
use super::rpc::{self, Method, Notification, RpcResult};
use super::sender::{self, Outbound, OutboundTx};
use crate::auth::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

// ── ConnectionState ─────────────────────────────────────────────────

/// Lifecycle of the physical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// ── Connection ──────────────────────────────────────────────────────

/// Shared handle to one endpoint's session. Clones share everything.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    endpoint: Endpoint,
    config: TransportConfig,
    correlator: Arc<Correlator>,
    state: Arc<watch::Sender<ConnectionState>>,
    notifications: broadcast::Sender<Notification>,
    outbound: ArcSwapOption<Link>,
    /// Parent of every session's cancellation token.
    shutdown: CancellationToken,
    session: Mutex<Option<Session>>,
}

/// Write side of the live session. The sequence counter lives here so a
/// number is always drawn from the session its request is queued on.
struct Link {
    tx: OutboundTx,
    seq: AtomicU64,
}

impl Link {
    /// Next movement sequence number (first is 1).
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Background tasks of one logged-in socket.
struct Session {
    cancel: CancellationToken,
    reader: JoinHandle<()>,
    sender: JoinHandle<()>,
}

impl Connection {
    pub fn new(endpoint: Endpoint, config: TransportConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        Self {
            inner: Arc::new(ConnectionInner {
                endpoint,
                config,
                correlator: Arc::new(Correlator::new()),
                state: Arc::new(state),
                notifications,
                outbound: ArcSwapOption::empty(),
                shutdown: CancellationToken::new(),
                session: Mutex::new(None),
            }),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    pub fn config(&self) -> &TransportConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Unsolicited frames carrying a `method`, forwarded verbatim.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifications.subscribe()
    }

    /// Number of requests currently awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.inner.correlator.len()
    }

    /// Whether two handles drive the same session.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open and log in a session if there is none.
    ///
    /// Returns `Ok(())` at once when already connected, and
    /// [`Error::ConnectInProgress`] at once when another caller is
    /// connecting. Attempts are never queued.
    pub async fn connect(&self) -> Result<(), Error> {
        if self.is_connected() {
            return Ok(());
        }
        let Ok(mut slot) = self.inner.session.try_lock() else {
            return Err(Error::ConnectInProgress);
        };
        if self.is_connected() {
            return Ok(());
        }

        // The reader dropped the last session without a disconnect.
        if let Some(stale) = slot.take() {
            debug!(endpoint = %self.inner.endpoint, "reaping dead session");
            self.teardown(stale).await;
        }

        self.inner.state.send_replace(ConnectionState::Connecting);
        match self.open().await {
            Ok(session) => {
                *slot = Some(session);
                info!(endpoint = %self.inner.endpoint, "telnet session established");
                Ok(())
            }
            Err(e) => {
                self.inner.state.send_replace(ConnectionState::Disconnected);
                warn!(endpoint = %self.inner.endpoint, error = %e, "telnet connect failed");
                Err(e)
            }
        }
    }

    /// Close the session, stop both tasks, and fail every pending request.
    /// No-op when already disconnected.
    pub async fn disconnect(&self) {
        let mut slot = self.inner.session.lock().await;
        let Some(session) = slot.take() else {
            return;
        };
        self.inner.state.send_replace(ConnectionState::Disconnected);
        self.teardown(session).await;
        info!(endpoint = %self.inner.endpoint, "telnet session closed");
    }

    /// Connect if needed, riding along on a concurrent attempt instead of
    /// starting a second one.
    pub async fn ensure_connected(&self) -> Result<(), Error> {
        match self.connect().await {
            Err(Error::ConnectInProgress) => self.await_concurrent_connect().await,
            other => other,
        }
    }

    async fn await_concurrent_connect(&self) -> Result<(), Error> {
        let budget = self.inner.config.connect_budget();
        debug!(endpoint = %self.inner.endpoint, "waiting for concurrent connect");

        // The holder releases the lock once its attempt has settled.
        if tokio::time::timeout(budget, self.inner.session.lock())
            .await
            .is_err()
        {
            return Err(Error::Connect {
                endpoint: self.inner.endpoint.address(),
                reason: format!(
                    "concurrent connect did not settle within {}ms",
                    budget.as_millis()
                ),
            });
        }

        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::Connect {
                endpoint: self.inner.endpoint.address(),
                reason: "concurrent connect attempt failed".into(),
            })
        }
    }

    async fn open(&self) -> Result<Session, Error> {
        let endpoint = &self.inner.endpoint;
        let config = &self.inner.config;
        let address = endpoint.address();
        debug!(%address, "opening telnet socket");

        let mut stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| Error::Connect {
                endpoint: address.clone(),
                reason: format!("timed out after {}ms", config.connect_timeout.as_millis()),
            })?
            .map_err(|e| Error::Connect {
                endpoint: address.clone(),
                reason: e.to_string(),
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "could not set TCP_NODELAY");
        }

        // On failure the stream drops here and the socket closes.
        let leftover =
            handshake::perform_handshake(&mut stream, &endpoint.credentials, config.handshake_timeout)
                .await?;

        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel::<Outbound>();
        self.inner.outbound.store(Some(Arc::new(Link {
            tx,
            seq: AtomicU64::new(0),
        })));

        // Published before the reader starts so a loss it reports is never
        // overwritten.
        self.inner.state.send_replace(ConnectionState::Connected);

        let cancel = self.inner.shutdown.child_token();
        let reader = tokio::spawn(reader::run(
            read_half,
            leftover,
            ReaderContext {
                correlator: Arc::clone(&self.inner.correlator),
                state: Arc::clone(&self.inner.state),
                notifications: self.inner.notifications.clone(),
            },
            cancel.clone(),
        ));
        let sender = tokio::spawn(sender::run(
            write_half,
            rx,
            Arc::clone(&self.inner.correlator),
            config.pacing,
            cancel.clone(),
        ));

        Ok(Session {
            cancel,
            reader,
            sender,
        })
    }

    async fn teardown(&self, session: Session) {
        session.cancel.cancel();
        if let Err(e) = session.reader.await {
            warn!(error = %e, "reader task panicked");
        }
        if let Err(e) = session.sender.await {
            warn!(error = %e, "sender task panicked");
        }
        self.inner.outbound.store(None);
        let failed = self.inner.correlator.fail_all();
        if failed > 0 {
            debug!(failed, "pending requests failed on teardown");
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Send one request and wait for its response.
    pub async fn call(&self, method: Method, params: Vec<Value>) -> Result<RpcResult, Error> {
        self.ensure_connected().await?;
        let link = self.link()?;
        let (id, rx) = self.enqueue(&link, method, &params)?;
        self.wait(id, method, rx).await
    }

    /// Like [`call`](Self::call), for movement commands: `params` receives
    /// the next sequence number of the session the request is queued on.
    pub async fn call_sequenced(
        &self,
        method: Method,
        params: impl FnOnce(u64) -> Vec<Value>,
    ) -> Result<RpcResult, Error> {
        self.ensure_connected().await?;
        let link = self.link()?;
        let params = params(link.next_seq());
        let (id, rx) = self.enqueue(&link, method, &params)?;
        self.wait(id, method, rx).await
    }

    fn link(&self) -> Result<Arc<Link>, Error> {
        self.inner.outbound.load_full().ok_or(Error::ConnectionLost)
    }

    fn enqueue(
        &self,
        link: &Link,
        method: Method,
        params: &[Value],
    ) -> Result<(u64, oneshot::Receiver<Reply>), Error> {
        let correlator = &self.inner.correlator;
        let (id, rx) = correlator.register(method);
        let line = match rpc::encode_request(method, params, id) {
            Ok(line) => line,
            Err(e) => {
                correlator.forget(id);
                return Err(e);
            }
        };
        if link.tx.send(Outbound { id, method, line }).is_err() {
            correlator.forget(id);
            return Err(Error::ConnectionLost);
        }
        debug!(id, %method, "request queued");
        Ok((id, rx))
    }

    async fn wait(
        &self,
        id: u64,
        method: Method,
        rx: oneshot::Receiver<Reply>,
    ) -> Result<RpcResult, Error> {
        // Releases the slot if this future is dropped before an answer.
        let mut slot = PendingSlot {
            correlator: &self.inner.correlator,
            id,
            settled: false,
        };
        let timeout = self.inner.config.request_timeout;
        let outcome = tokio::time::timeout(timeout, rx).await;
        slot.settled = true;
        match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(Error::ConnectionLost),
            Err(_) => {
                self.inner.correlator.forget(id);
                warn!(id, %method, "request timed out");
                Err(timed_out(method, timeout))
            }
        }
    }
}

fn timed_out(method: Method, timeout: Duration) -> Error {
    Error::Timeout {
        method: method.to_string(),
        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
    }
}

/// Pending entry of a caller still waiting in [`Connection::call`].
struct PendingSlot<'a> {
    correlator: &'a Correlator,
    id: u64,
    settled: bool,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if !self.settled && self.correlator.forget(self.id) {
            debug!(id = self.id, "caller stopped waiting, request forgotten");
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.inner.endpoint.address())
            .field("state", &self.state())
            .field("pending", &self.pending_requests())
            .finish_non_exhaustive()
    }
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        // Last handle gone: stop any session tasks still running.
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_waiter_forgets_its_request() {
        let correlator = Correlator::new();
        let (abandoned, _rx) = correlator.register(Method::Position);
        drop(PendingSlot {
            correlator: &correlator,
            id: abandoned,
            settled: false,
        });
        assert_eq!(correlator.len(), 0);

        let (answered, _rx) = correlator.register(Method::Position);
        drop(PendingSlot {
            correlator: &correlator,
            id: answered,
            settled: true,
        });
        assert_eq!(correlator.len(), 1);
    }
}
