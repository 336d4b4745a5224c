// ── Core error types ──
//
// User-facing errors from somfly-core. Consumers never see JSON-RPC frames
// or request ids directly. The `From<somfly_api::Error>` impl translates
// session and protocol failures into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Controller did not answer {operation} within {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Shade not found: {identifier}")]
    ShadeNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by controller: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String },
}

impl CoreError {
    /// Worth retrying later: the session dropped or the controller was slow.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ControllerDisconnected | Self::Timeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<somfly_api::Error> for CoreError {
    fn from(err: somfly_api::Error) -> Self {
        use somfly_api::Error as Api;

        match err {
            Api::Connect { endpoint, reason } => CoreError::ConnectionFailed { endpoint, reason },
            // The UAI+ drops the socket on a bad login instead of answering,
            // so a failure past the username prompt means the credentials.
            Api::Handshake {
                expected: "User:",
                reason,
            } => CoreError::ConnectionFailed {
                endpoint: String::new(),
                reason: format!("no login prompt: {reason}"),
            },
            Api::Handshake { expected, reason } => CoreError::AuthenticationFailed {
                message: format!("login rejected while waiting for {expected:?}: {reason}"),
            },
            Api::ConnectInProgress => CoreError::ConnectionFailed {
                endpoint: String::new(),
                reason: "another connection attempt is in progress".into(),
            },
            Api::ConnectionLost | Api::Send { .. } => CoreError::ControllerDisconnected,
            Api::Timeout { method, timeout_ms } => CoreError::Timeout {
                operation: method,
                timeout_ms,
            },
            Api::CommandRejected {
                method,
                node_id,
                result,
            } => CoreError::Rejected {
                message: format!("{method} for shade {node_id} answered {result}"),
            },
            Api::InvalidNodeId(id) => CoreError::ValidationFailed {
                message: format!("invalid node id {id:?} (expected XXXXXX or XX.XX.XX hex)"),
            },
            Api::InvalidPosition(p) => CoreError::ValidationFailed {
                message: format!("invalid position {p} (must be 0-100)"),
            },
            other @ (Api::Rpc { .. }
            | Api::MalformedResponse { .. }
            | Api::UnexpectedResult { .. }
            | Api::Serialization(_)) => CoreError::Api {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn password_rejection_is_an_auth_failure() {
        let err = CoreError::from(somfly_api::Error::Handshake {
            expected: "Connected:",
            reason: "connection closed by controller".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn missing_user_prompt_is_a_connection_failure() {
        let err = CoreError::from(somfly_api::Error::Handshake {
            expected: "User:",
            reason: "no data within 10000ms".into(),
        });
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn rejected_move_keeps_context() {
        let err = CoreError::from(somfly_api::Error::CommandRejected {
            method: "sdn.move.up".into(),
            node_id: "132A01".into(),
            result: json!(false),
        });
        assert_eq!(
            err.to_string(),
            "Operation rejected by controller: sdn.move.up for shade 132A01 answered false"
        );
    }

    #[test]
    fn timeout_maps_through() {
        let err = CoreError::from(somfly_api::Error::Timeout {
            method: "sdn.status.position".into(),
            timeout_ms: 10_000,
        });
        assert!(matches!(err, CoreError::Timeout { timeout_ms: 10_000, .. }));
    }
}
