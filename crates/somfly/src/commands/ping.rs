//! Ping handler.

use std::time::Instant;

use serde::Serialize;
use somfly_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct PingReport {
    endpoint: String,
    alive: bool,
    /// Includes connect and login on a cold session.
    elapsed_ms: u64,
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let started = Instant::now();
    let alive = controller.ping().await?;
    let report = PingReport {
        endpoint: controller.config().endpoint().address(),
        alive,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    let out = output::render_single(
        global.output(),
        &report,
        |r| {
            if r.alive {
                format!("{} is alive ({} ms)", r.endpoint, r.elapsed_ms)
            } else {
                format!("{} answered without a node list", r.endpoint)
            }
        },
        |r| r.alive.to_string(),
    );
    output::print_output(&out, global.quiet);

    if alive {
        Ok(())
    } else {
        Err(CliError::Api {
            message: "ping did not return a node list".into(),
        })
    }
}
