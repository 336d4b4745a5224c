// ── Runtime connection configuration ──
//
// Describes how to reach one UAI+ controller. Carries credentials and
// transport tuning but never touches disk: the CLI builds a
// `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use somfly_api::{
    Credentials, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_USERNAME, Endpoint, TransportConfig,
};

/// Configuration for one controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Hostname or IP address of the UAI+.
    pub host: String,
    /// Telnet port.
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Per-request response deadline.
    pub timeout: Duration,
    /// Bound on opening the socket and on each login prompt.
    pub connect_timeout: Duration,
    /// Pause between consecutive writes.
    pub pacing: Duration,
}

impl ControllerConfig {
    /// Config for `host` with vendor defaults for everything else.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// The session identity handed to the registry.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone())
            .with_port(self.port)
            .with_credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: self.connect_timeout,
            handshake_timeout: self.connect_timeout,
            request_timeout: self.timeout,
            pacing: self.pacing,
            ..TransportConfig::default()
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.into(),
            password: SecretString::from(DEFAULT_PASSWORD),
            timeout: transport.request_timeout,
            connect_timeout: transport.connect_timeout,
            pacing: transport.pacing,
        }
    }
}
