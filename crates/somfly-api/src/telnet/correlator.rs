// Pending-request table
//
// Maps request ids to the oneshot slot of the caller awaiting them. An entry
// leaves the table exactly once: resolved by a response, failed by the
// sender or a teardown, or forgotten by a caller that stopped waiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use super::rpc::{Method, Outcome, RpcResult};
use crate::error::Error;

/// First id handed out on a fresh endpoint.
pub const FIRST_REQUEST_ID: u64 = 8901;

pub(crate) type Reply = Result<RpcResult, Error>;

struct Pending {
    method: Method,
    created_at: Instant,
    tx: oneshot::Sender<Reply>,
}

pub(crate) struct Correlator {
    pending: DashMap<u64, Pending>,
    next_id: AtomicU64,
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            next_id: AtomicU64::new(FIRST_REQUEST_ID),
        }
    }

    /// Allocate an id and park a completion slot under it.
    pub fn register(&self, method: Method) -> (u64, oneshot::Receiver<Reply>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            id,
            Pending {
                method,
                created_at: Instant::now(),
                tx,
            },
        );
        trace!(id, %method, "request registered");
        (id, rx)
    }

    /// Complete a request from its response. Returns `false` if nobody is
    /// waiting for `id` (late, duplicate, or unsolicited).
    pub fn resolve(&self, id: u64, outcome: Outcome) -> bool {
        let Some((_, pending)) = self.pending.remove(&id) else {
            return false;
        };
        let method = pending.method;
        debug!(
            id,
            %method,
            elapsed_ms = u64::try_from(pending.created_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "response received"
        );
        let reply = match outcome {
            Outcome::Result(value) => Ok(RpcResult::classify(value)),
            Outcome::Error(error) => Err(Error::Rpc {
                method: method.to_string(),
                error,
            }),
            Outcome::Empty => Err(Error::MalformedResponse {
                method: method.to_string(),
            }),
        };
        // The caller may have given up in the meantime.
        let _ = pending.tx.send(reply);
        true
    }

    /// Fail one request with `error`.
    pub fn fail(&self, id: u64, error: Error) -> bool {
        match self.pending.remove(&id) {
            Some((_, pending)) => {
                let _ = pending.tx.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Drop a request whose caller stopped waiting.
    pub fn forget(&self, id: u64) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Fail every outstanding request with `ConnectionLost`.
    pub fn fail_all(&self) -> usize {
        let ids: Vec<u64> = self.pending.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter(|id| self.fail(*id, Error::ConnectionLost))
            .count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
