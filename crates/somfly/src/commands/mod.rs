//! Command dispatch: bridges CLI args -> core Controller -> output formatting.

pub mod config_cmd;
pub mod node_id;
pub mod ping;
pub mod shades;

use somfly_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Ping => ping::handle(controller, global).await,
        Command::Shades(args) => shades::handle(controller, args, global).await,
        // Offline commands are handled before a controller exists
        Command::NodeId(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
