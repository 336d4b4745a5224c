// ── Domain model ──

pub mod shade;

pub use shade::{HostPosition, Shade};
