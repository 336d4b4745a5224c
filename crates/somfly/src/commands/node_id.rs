//! Offline node id conversion.

use serde::Serialize;
use somfly_api::node_id::{denormalize, normalize};

use crate::cli::{GlobalOpts, NodeIdArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Converted {
    compact: String,
    dotted: String,
}

/// Whichever form `id` is in, pair it with the other.
fn convert(id: &str) -> Result<Converted, CliError> {
    let id = id.trim();
    let converted = if id.contains('.') {
        denormalize(id).map(|compact| Converted {
            compact,
            dotted: id.to_owned(),
        })
    } else {
        normalize(id).map(|dotted| Converted {
            compact: id.to_owned(),
            dotted,
        })
    };
    converted.map_err(|_| CliError::Validation {
        field: "id".into(),
        reason: format!("{id:?} is neither XXXXXX nor XX.XX.XX hex"),
    })
}

#[allow(clippy::needless_pass_by_value)]
pub fn handle(args: NodeIdArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let converted = convert(&args.id)?;
    let input_was_dotted = args.id.contains('.');
    let other_form = |c: &Converted| {
        if input_was_dotted {
            c.compact.clone()
        } else {
            c.dotted.clone()
        }
    };
    let out = output::render_single(global.output(), &converted, other_form, other_form);
    output::print_output(&out, global.quiet);
    Ok(())
}
