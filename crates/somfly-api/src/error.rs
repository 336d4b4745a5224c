use thiserror::Error;

/// Top-level error type for the `somfly-api` crate.
///
/// Covers every failure mode of the Telnet JSON-RPC session:
/// connection setup, login handshake, request correlation, and the
/// shape of controller replies. `somfly-core` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// Opening the TCP socket failed or timed out.
    #[error("Cannot connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// The login dialogue did not reach the expected prompt.
    #[error("Handshake failed waiting for {expected:?}: {reason}")]
    Handshake {
        expected: &'static str,
        reason: String,
    },

    /// Another caller is already opening the session for this endpoint.
    #[error("Connection attempt already in progress")]
    ConnectInProgress,

    /// The session dropped (peer close, read error, or explicit disconnect)
    /// before the request was answered.
    #[error("Connection lost")]
    ConnectionLost,

    /// Writing a queued request to the socket failed.
    #[error("Failed to send {method}: {source}")]
    Send {
        method: String,
        #[source]
        source: std::io::Error,
    },

    // ── Request lifecycle ───────────────────────────────────────────
    /// No response arrived within the per-request deadline.
    #[error("Request {method} timed out after {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },

    // ── Protocol ────────────────────────────────────────────────────
    /// The controller answered with an `error` member.
    #[error("RPC error from {method}: {error}")]
    Rpc {
        method: String,
        error: serde_json::Value,
    },

    /// The response carried neither `result` nor `error`.
    #[error("Malformed response to {method}: neither result nor error present")]
    MalformedResponse { method: String },

    /// `result` was present but not the shape the method promises.
    #[error("Unexpected result from {method}: expected {expected}, got {got}")]
    UnexpectedResult {
        method: String,
        expected: &'static str,
        got: serde_json::Value,
    },

    /// A move command was answered with something other than `true`.
    #[error("{method} rejected for shade {node_id}: {result}")]
    CommandRejected {
        method: String,
        node_id: String,
        result: serde_json::Value,
    },

    // ── Validation ──────────────────────────────────────────────────
    /// A node id was neither `XXXXXX` nor `XX.XX.XX` hex.
    #[error("Invalid node id {0:?}")]
    InvalidNodeId(String),

    /// A position outside 0–100.
    #[error("Invalid position {0} (must be 0-100)")]
    InvalidPosition(i64),

    // ── Data ────────────────────────────────────────────────────────
    /// Request serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the failure concerns the session itself rather
    /// than one request. The next call reconnects on demand.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::Handshake { .. }
                | Self::ConnectInProgress
                | Self::ConnectionLost
                | Self::Send { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        self.is_connection_error() || matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the controller itself refused or garbled the call.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::Rpc { .. }
                | Self::MalformedResponse { .. }
                | Self::UnexpectedResult { .. }
                | Self::CommandRejected { .. }
        )
    }
}
