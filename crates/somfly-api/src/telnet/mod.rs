// JSON-RPC over Telnet
//
// framer → reader → correlator ← sender, owned by a `Connection` and shared
// per endpoint through a `SessionRegistry`.

pub mod client;
pub mod connection;
mod correlator;
pub mod framer;
pub mod handshake;
mod reader;
pub mod registry;
pub mod rpc;
mod sender;
pub mod shades;

pub use client::TelnetClient;
pub use connection::{Connection, ConnectionState};
pub use correlator::FIRST_REQUEST_ID;
pub use registry::SessionRegistry;
pub use rpc::{Method, Notification, RpcResult};
pub use shades::{ShadeInfo, ShadeStatus};
