// Endpoint identity and Telnet login credentials
//
// An `Endpoint` is the sharing key for sessions: every client handle built
// for the same host, port, and credential pair rides one physical socket.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Telnet port the UAI+ listens on.
pub const DEFAULT_PORT: u16 = 23;
/// Factory-default Telnet user.
pub const DEFAULT_USERNAME: &str = "Telnet 1";
/// Factory-default Telnet password.
pub const DEFAULT_PASSWORD: &str = "Password 1";

/// Username/password pair sent during the login handshake.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, SecretString::from(DEFAULT_PASSWORD))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Identity of one controller session: where to connect and how to log in.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
}

impl Endpoint {
    /// Endpoint on the default port with factory credentials.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            credentials: Credentials::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// `host:port`, as used for dialing and in log fields.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Hashable key for the session registry. Includes the password so that
    /// handles with different credentials never share a logged-in socket.
    pub(crate) fn key(&self) -> EndpointKey {
        EndpointKey {
            host: self.host.to_ascii_lowercase(),
            port: self.port,
            username: self.credentials.username.clone(),
            password: self.credentials.password.expose_secret().to_owned(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct EndpointKey {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl fmt::Debug for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}
