//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use somfly_core::HostPosition;

use crate::cli::{ColorMode, OutputFormat};

const BAR_WIDTH: u8 = 10;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// `[######----]  60%`: filled cells are the open share.
pub fn position_bar(position: HostPosition, color: bool) -> String {
    let filled = (position.percent() + BAR_WIDTH / 2) / BAR_WIDTH;
    let open = "#".repeat(usize::from(filled));
    let closed = "-".repeat(usize::from(BAR_WIDTH - filled));
    let label = format!("{:>3}%", position.percent());
    if color {
        let label = if position.is_closed() {
            label.red().to_string()
        } else {
            label.green().to_string()
        };
        format!("[{}{}] {label}", open.cyan(), closed.dimmed())
    } else {
        format!("[{open}{closed}] {label}")
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: &'static str,
        percent: u8,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
    }

    #[test]
    fn bar_fills_with_the_open_share() {
        let bar = position_bar(HostPosition::new(60).unwrap(), false);
        assert_eq!(bar, "[######----]  60%");
        assert_eq!(position_bar(HostPosition::CLOSED, false), "[----------]   0%");
        assert_eq!(position_bar(HostPosition::OPEN, false), "[##########] 100%");
    }

    #[test]
    fn plain_and_json_lists() {
        let items = [
            Item {
                id: "13.2A.01",
                percent: 70,
            },
            Item {
                id: "13.29.FB",
                percent: 0,
            },
        ];
        let to_row = |i: &Item| ItemRow { id: i.id.into() };
        let id = |i: &Item| i.id.to_owned();

        let plain = render_list(OutputFormat::Plain, &items, to_row, id);
        assert_eq!(plain, "13.2A.01\n13.29.FB");

        let json = render_list(OutputFormat::JsonCompact, &items, to_row, id);
        assert_eq!(
            json,
            r#"[{"id":"13.2A.01","percent":70},{"id":"13.29.FB","percent":0}]"#
        );

        let table = render_list(OutputFormat::Table, &items, to_row, id);
        assert!(table.contains("13.29.FB"));
    }
}
