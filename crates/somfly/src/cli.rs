//! Clap derive structures for the `somfly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// somfly -- control Somfy shades through a UAI+ controller
#[derive(Debug, Parser)]
#[command(
    name = "somfly",
    version,
    about = "Control Somfy shades through a UAI+ controller",
    long_about = "Talks JSON-RPC over the UAI+ Telnet interface.\n\n\
        Positions are shown in the host convention: 0 is closed, 100 is open.\n\
        Shade ids are accepted as 132A01 or 13.2A.01.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "SOMFLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller host or IP (overrides profile)
    #[arg(long, short = 'H', env = "SOMFLY_HOST", global = true)]
    pub host: Option<String>,

    /// Telnet port (overrides profile)
    #[arg(long, env = "SOMFLY_PORT", global = true)]
    pub port: Option<u16>,

    /// Telnet user (overrides profile)
    #[arg(long, short = 'u', env = "SOMFLY_USERNAME", global = true)]
    pub username: Option<String>,

    /// Telnet password (overrides profile)
    #[arg(long, env = "SOMFLY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Response timeout in seconds
    #[arg(long, short = 't', env = "SOMFLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "SOMFLY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto, or `defaults.color` from config]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Output format once flags and config defaults are applied.
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// One id per line (for piping)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the controller answers
    Ping,

    /// List, inspect, and move shades
    #[command(alias = "s")]
    Shades(ShadesArgs),

    /// Convert a shade id between compact and dotted forms (offline)
    NodeId(NodeIdArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shades ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShadesArgs {
    #[command(subcommand)]
    pub command: ShadesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShadesCommand {
    /// List every shade with name, model, and position
    #[command(alias = "ls")]
    List,

    /// Show one shade
    Info {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },

    /// Show the current position (0 = closed, 100 = open)
    Position {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },

    /// Move to a position (0 = closed, 100 = open)
    MoveTo(MoveToArgs),

    /// Open fully
    Open {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },

    /// Close fully
    Close {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },

    /// Send the device-native "up" command
    Up {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },

    /// Send the device-native "down" command
    Down {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },

    /// Stop any movement in progress
    Stop {
        /// Shade id (132A01 or 13.2A.01)
        node: String,
    },
}

#[derive(Debug, Args)]
pub struct MoveToArgs {
    /// Shade id (132A01 or 13.2A.01)
    pub node: String,

    /// Target position, 0 (closed) to 100 (open)
    #[arg(
        value_parser = clap::value_parser!(u8).range(0..=100),
        required_unless_present = "raw"
    )]
    pub position: Option<u8>,

    /// Raw motor position, scaled between --limits-up and --limits-down
    #[arg(
        long,
        conflicts_with = "position",
        requires_all = ["limits_up", "limits_down"],
        allow_negative_numbers = true
    )]
    pub raw: Option<i64>,

    /// Raw motor position of the upper limit
    #[arg(long, requires = "raw", allow_negative_numbers = true)]
    pub limits_up: Option<i64>,

    /// Raw motor position of the lower limit
    #[arg(long, requires = "raw", allow_negative_numbers = true)]
    pub limits_down: Option<i64>,
}

// ── Node ids ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodeIdArgs {
    /// Id in either form; prints the other form
    pub id: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration (passwords masked)
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn move_to_accepts_percent_or_raw() {
        let cli = Cli::try_parse_from(["somfly", "shades", "move-to", "132A01", "70"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from([
            "somfly",
            "shades",
            "move-to",
            "132A01",
            "--raw",
            "1750",
            "--limits-up",
            "1000",
            "--limits-down",
            "2000",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["somfly", "shades", "move-to", "132A01", "101"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["somfly", "shades", "move-to", "132A01", "--raw", "5"]);
        assert!(cli.is_err());
    }
}
