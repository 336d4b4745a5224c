//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use somfly_config::ConfigError;
use somfly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {endpoint}")]
    #[diagnostic(
        code(somfly::connection_failed),
        help(
            "Check that the UAI+ is powered and reachable, and that Telnet is enabled.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Controller connection was lost")]
    #[diagnostic(
        code(somfly::disconnected),
        help("The controller closed the session. Retry the command.")
    )]
    Disconnected,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(somfly::auth_failed),
        help(
            "Verify the Telnet user and password on the controller.\n\
             Set them with --username/--password or in the profile."
        )
    )]
    AuthFailed { message: String },

    // ── Shades ───────────────────────────────────────────────────────

    #[error("Shade '{identifier}' not found")]
    #[diagnostic(
        code(somfly::not_found),
        help("Run: somfly shades list to see the shades the controller knows")
    )]
    ShadeNotFound { identifier: String },

    #[error("Controller rejected the command: {message}")]
    #[diagnostic(code(somfly::rejected))]
    Rejected { message: String },

    // ── Protocol ─────────────────────────────────────────────────────

    #[error("Controller error: {message}")]
    #[diagnostic(code(somfly::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(somfly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(somfly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Add one to the config file or pass --host."
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(somfly::no_config),
        help(
            "Pass --host (or set SOMFLY_HOST), or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(somfly::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Controller did not answer {operation} within {timeout_ms}ms")]
    #[diagnostic(
        code(somfly::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { operation: String, timeout_ms: u64 },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Disconnected => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ShadeNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Api { .. } | Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { endpoint, reason } => {
                CliError::ConnectionFailed { endpoint, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ControllerDisconnected => CliError::Disconnected,
            CoreError::Timeout {
                operation,
                timeout_ms,
            } => CliError::Timeout {
                operation,
                timeout_ms,
            },
            CoreError::ShadeNotFound { identifier } => CliError::ShadeNotFound { identifier },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "argument".into(),
                reason: message,
            },
            CoreError::Api { message } => CliError::Api { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_distinct_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    endpoint: "10.1.1.50:23".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::AuthenticationFailed {
                    message: "bad password".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::ShadeNotFound {
                    identifier: "13.2A.01".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Timeout {
                    operation: "sdn.status.info".into(),
                    timeout_ms: 10_000,
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::ValidationFailed {
                    message: "bad id".into(),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn missing_profile_is_not_found() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "attic".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
