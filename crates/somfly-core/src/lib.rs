//! Host-facing shade control between `somfly-api` and its consumers (CLI,
//! home-automation glue).
//!
//! - **[`Controller`]**: façade over one UAI+ session. Positions are in the
//!   host convention (0 = closed, 100 = open); node ids are accepted in the
//!   compact or dotted form. [`Controller::oneshot()`] suits single CLI
//!   invocations.
//!
//! - **[`convert`]**: the fixed device/host position inversion and the
//!   raw-limit scaling helper.
//!
//! - **Domain model** ([`model`]): [`Shade`] and [`HostPosition`].
//!
//! - **[`CoreError`]**: user-facing errors translated from
//!   `somfly_api::Error`.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ControllerConfig;
pub use controller::{Controller, parse_node};
pub use error::CoreError;
pub use model::{HostPosition, Shade};

pub use somfly_api::telnet::ConnectionState;
pub use somfly_api::{NodeId, SessionRegistry};
