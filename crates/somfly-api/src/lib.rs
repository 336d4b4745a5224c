// somfly-api: Async Rust client for the Somfy UAI+ shade controller (JSON-RPC over Telnet)

pub mod auth;
pub mod error;
pub mod node_id;
pub mod position;
pub mod telnet;
pub mod transport;

pub use auth::{Credentials, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_USERNAME, Endpoint};
pub use error::Error;
pub use node_id::NodeId;
pub use position::Position;
pub use telnet::{
    ConnectionState, Method, Notification, RpcResult, SessionRegistry, ShadeInfo, ShadeStatus,
    TelnetClient,
};
pub use transport::TransportConfig;
