// JSON-RPC request encoding and response classification
//
// Requests are `{"method", "params", "id"}` on one CRLF-terminated line.
// Responses carry the same `id` plus exactly one of `result` or `error`.
// The controller's `result` is untyped, so it is classified once at the
// parse boundary into `RpcResult` and domain operations match on that.

use serde::Serialize;
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::Error;

// ── Method ──────────────────────────────────────────────────────────

/// Every JSON-RPC method the controller is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Method {
    #[strum(serialize = "sdn.status.ping")]
    Ping,
    #[strum(serialize = "sdn.status.info")]
    Info,
    #[strum(serialize = "sdn.status.position")]
    Position,
    #[strum(serialize = "sdn.move.to")]
    MoveTo,
    #[strum(serialize = "sdn.move.up")]
    MoveUp,
    #[strum(serialize = "sdn.move.down")]
    MoveDown,
    #[strum(serialize = "sdn.move.stop")]
    MoveStop,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Movement commands carry a sequence number and answer with a flag.
    pub fn is_move(self) -> bool {
        matches!(
            self,
            Self::MoveTo | Self::MoveUp | Self::MoveDown | Self::MoveStop
        )
    }
}

// ── Request ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RpcRequest<'a> {
    method: &'static str,
    params: &'a [Value],
    id: u64,
}

/// Serialize one request as a CRLF-terminated line.
pub fn encode_request(method: Method, params: &[Value], id: u64) -> Result<String, Error> {
    let mut line = serde_json::to_string(&RpcRequest {
        method: method.as_str(),
        params,
        id,
    })?;
    line.push_str("\r\n");
    Ok(line)
}

// ── Result ──────────────────────────────────────────────────────────

/// The shapes a `result` member can take.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResult {
    /// A list of node ids (`sdn.status.ping`).
    NodeList(Vec<String>),
    /// `{name, type}` (`sdn.status.info`). Either member may be missing.
    Info {
        name: Option<String>,
        kind: Option<String>,
    },
    /// A whole number (`sdn.status.position`).
    Integer(i64),
    /// An acknowledgement (`sdn.move.*`).
    Flag(bool),
    Null,
    /// Anything else, kept verbatim for error reporting.
    Unrecognized(Value),
}

impl RpcResult {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Flag(flag),
            Value::Number(n) => match whole_number(&n) {
                Some(i) => Self::Integer(i),
                None => Self::Unrecognized(Value::Number(n)),
            },
            Value::Array(items) if items.iter().all(Value::is_string) => Self::NodeList(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Object(map) => Self::Info {
                name: string_member(&map, "name"),
                kind: string_member(&map, "type"),
            },
            other => Self::Unrecognized(other),
        }
    }

    /// The JSON this result was classified from (modulo member order).
    pub fn to_value(&self) -> Value {
        match self {
            Self::NodeList(ids) => Value::from(ids.clone()),
            Self::Info { name, kind } => {
                let mut map = Map::new();
                if let Some(name) = name {
                    map.insert("name".into(), Value::from(name.as_str()));
                }
                if let Some(kind) = kind {
                    map.insert("type".into(), Value::from(kind.as_str()));
                }
                Value::Object(map)
            }
            Self::Integer(i) => Value::from(*i),
            Self::Flag(flag) => Value::Bool(*flag),
            Self::Null => Value::Null,
            Self::Unrecognized(value) => value.clone(),
        }
    }
}

/// Integers, and floats with no fractional part (some firmware sends `42.0`).
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract().abs() < f64::EPSILON && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}

fn string_member(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

// ── Incoming frames ─────────────────────────────────────────────────

/// An unsolicited frame carrying a `method`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub params: Value,
}

/// What a response frame says about its request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Result(Value),
    Error(Value),
    /// Neither `result` nor `error` was present.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Response { id: u64, outcome: Outcome },
    Notification(Notification),
    /// No usable `id` and no `method`.
    Unaddressed,
}

/// Parse one candidate frame.
pub fn parse_frame(frame: &str) -> Result<Incoming, serde_json::Error> {
    let mut map: Map<String, Value> = serde_json::from_str(frame)?;
    let id = map.get("id").and_then(Value::as_u64);

    let outcome = if let Some(result) = map.remove("result") {
        Some(Outcome::Result(result))
    } else {
        map.remove("error").map(Outcome::Error)
    };

    Ok(match (id, outcome) {
        (Some(id), Some(outcome)) => Incoming::Response { id, outcome },
        (_, None) if map.contains_key("method") => match map.remove("method") {
            Some(Value::String(method)) => Incoming::Notification(Notification {
                method,
                params: map.remove("params").unwrap_or(Value::Null),
            }),
            _ => Incoming::Unaddressed,
        },
        (Some(id), None) => Incoming::Response {
            id,
            outcome: Outcome::Empty,
        },
        (None, _) => Incoming::Unaddressed,
    })
}
