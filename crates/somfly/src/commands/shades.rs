//! Shade command handlers.

use serde::Serialize;
use tabled::Tabled;

use somfly_core::{Controller, CoreError, HostPosition, Shade, parse_node};

use crate::cli::{GlobalOpts, MoveToArgs, ShadesArgs, ShadesCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ShadeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    kind: String,
    #[tabled(rename = "Position")]
    position: String,
}

impl ShadeRow {
    fn new(shade: &Shade, color: bool) -> Self {
        Self {
            id: shade.dotted_id.clone(),
            name: shade.name.clone(),
            kind: shade.kind.clone(),
            position: output::position_bar(shade.position, color),
        }
    }
}

fn detail(shade: &Shade, color: bool) -> String {
    [
        format!("ID:        {} ({})", shade.dotted_id, shade.node_id),
        format!("Name:      {}", shade.name),
        format!("Model:     {}", shade.kind),
        format!("Position:  {}", output::position_bar(shade.position, color)),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct PositionReport {
    node_id: String,
    position: HostPosition,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ShadesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color());

    match args.command {
        ShadesCommand::List => {
            let mut shades = controller.shades().await?;
            shades.sort_by(|a, b| a.name.cmp(&b.name).then(a.node_id.cmp(&b.node_id)));
            let out = output::render_list(
                global.output(),
                &shades,
                |s| ShadeRow::new(s, color),
                |s| s.dotted_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShadesCommand::Info { node } => {
            let shade = controller.shade(&node).await?;
            let out = output::render_single(
                global.output(),
                &shade,
                |s| detail(s, color),
                |s| s.dotted_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShadesCommand::Position { node } => {
            let position = controller.position(&node).await?;
            let report = PositionReport {
                node_id: parse_node(&node)?.dotted(),
                position,
            };
            let out = output::render_single(
                global.output(),
                &report,
                |r| output::position_bar(r.position, color),
                |r| r.position.percent().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShadesCommand::MoveTo(args) => move_to(controller, args, global).await,

        ShadesCommand::Open { node } => {
            controller.open(&node).await?;
            confirm(global, &node, "opening");
            Ok(())
        }

        ShadesCommand::Close { node } => {
            controller.close(&node).await?;
            confirm(global, &node, "closing");
            Ok(())
        }

        // Device-native commands go straight to the protocol client.
        ShadesCommand::Up { node } => {
            let id = parse_node(&node)?;
            controller
                .client()
                .move_up(&id)
                .await
                .map_err(CoreError::from)?;
            confirm(global, &node, "moving up");
            Ok(())
        }

        ShadesCommand::Down { node } => {
            let id = parse_node(&node)?;
            controller
                .client()
                .move_down(&id)
                .await
                .map_err(CoreError::from)?;
            confirm(global, &node, "moving down");
            Ok(())
        }

        ShadesCommand::Stop { node } => {
            controller.stop(&node).await?;
            confirm(global, &node, "stopped");
            Ok(())
        }
    }
}

async fn move_to(
    controller: &Controller,
    args: MoveToArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let MoveToArgs {
        node,
        position,
        raw,
        limits_up,
        limits_down,
    } = args;

    match (position, raw, limits_up, limits_down) {
        (Some(percent), ..) => {
            let target = HostPosition::new(i64::from(percent))?;
            controller.set_position(&node, target).await?;
            confirm(global, &node, &format!("moving to {target}"));
        }
        (None, Some(raw), Some(up), Some(down)) => {
            controller.set_position_raw(&node, raw, up, down).await?;
            confirm(global, &node, &format!("moving to raw {raw}"));
        }
        _ => {
            return Err(CliError::Validation {
                field: "position".into(),
                reason: "give a position, or --raw with --limits-up and --limits-down".into(),
            });
        }
    }
    Ok(())
}

/// Acknowledge a move on stderr, keeping stdout clean for piping.
fn confirm(global: &GlobalOpts, node: &str, action: &str) {
    if !global.quiet {
        eprintln!("{node}: {action}");
    }
}
