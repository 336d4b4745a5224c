// ── Shade node identifiers ──
//
// The Telnet protocol addresses shades by a compact 6-digit hex id
// (`132A01`); the HTTP/CGI protocol and most UIs use a dotted form
// (`13.2A.01`). Conversion is purely positional, so it is lossless in
// both directions and preserves the original digit case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const COMPACT_LEN: usize = 6;
const DOTTED_LEN: usize = 8;

/// Convert a compact wire id (`132A01`) to its dotted form (`13.2A.01`).
pub fn normalize(compact: &str) -> Result<String, Error> {
    if !is_compact(compact) {
        return Err(Error::InvalidNodeId(compact.to_owned()));
    }
    let (a, rest) = compact.split_at(2);
    let (b, c) = rest.split_at(2);
    Ok(format!("{a}.{b}.{c}"))
}

/// Convert a dotted id (`13.2A.01`) back to the compact wire form (`132A01`).
pub fn denormalize(dotted: &str) -> Result<String, Error> {
    if !is_dotted(dotted) {
        return Err(Error::InvalidNodeId(dotted.to_owned()));
    }
    Ok(dotted.chars().filter(|c| *c != '.').collect())
}

fn is_compact(s: &str) -> bool {
    s.len() == COMPACT_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_dotted(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == DOTTED_LEN
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'.',
            _ => b.is_ascii_hexdigit(),
        })
}

// ── NodeId ──────────────────────────────────────────────────────────

/// Address of one shade on the controller's internal network.
///
/// Always stored in the compact wire form with upper-case digits, so ids
/// compare equal however they were typed. Parses from either form;
/// [`dotted()`](Self::dotted) renders the display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// The compact wire form sent as `targetID`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dotted display form used by the HTTP protocol.
    pub fn dotted(&self) -> String {
        let (a, rest) = self.0.split_at(2);
        let (b, c) = rest.split_at(2);
        format!("{a}.{b}.{c}")
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let compact = if is_compact(s) {
            s.to_owned()
        } else {
            denormalize(s)?
        };
        Ok(Self(compact.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for NodeId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
