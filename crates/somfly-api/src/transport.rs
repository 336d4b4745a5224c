// Shared transport tuning for Telnet sessions.
//
// Every `Connection` built by the registry reads its timeouts and pacing
// from one `TransportConfig`, so all handles for an endpoint behave alike.

use std::time::Duration;

/// Timeouts and pacing for one Telnet session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bound on opening the TCP socket.
    pub connect_timeout: Duration,
    /// Bound on each read while waiting for a login prompt.
    pub handshake_timeout: Duration,
    /// How long a caller waits for its JSON-RPC response.
    pub request_timeout: Duration,
    /// Pause after every write before the next queued request goes out.
    /// The controller drops or corrupts frames written back-to-back.
    pub pacing: Duration,
    /// Capacity of the unsolicited-notification broadcast channel.
    pub notification_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            pacing: Duration::from_millis(100),
            notification_capacity: 64,
        }
    }
}

impl TransportConfig {
    /// Longest a caller may wait on somebody else's connect attempt:
    /// the socket open plus one read timeout per login prompt.
    pub fn connect_budget(&self) -> Duration {
        self.connect_timeout + self.handshake_timeout * 3
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}
