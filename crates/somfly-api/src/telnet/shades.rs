// Shade operations over JSON-RPC
//
// Positions here are device-native: 0 is open, 100 is closed.

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use super::client::TelnetClient;
use super::rpc::{Method, RpcResult};
use crate::error::Error;
use crate::node_id::NodeId;
use crate::position::Position;

/// Name and model of one shade, as reported by `sdn.status.info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadeInfo {
    pub node_id: NodeId,
    pub name: String,
    pub kind: String,
}

/// Info plus current position for one shade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadeStatus {
    #[serde(flatten)]
    pub info: ShadeInfo,
    pub position: Position,
}

fn target(node: &NodeId) -> Value {
    json!({ "targetID": node.as_str() })
}

impl TelnetClient {
    /// Connection test: `true` if the controller answers the node scan
    /// with a list.
    pub async fn ping(&self) -> Result<bool, Error> {
        let result = self
            .call(Method::Ping, vec![json!({ "targetID": "*" })])
            .await?;
        Ok(matches!(result, RpcResult::NodeList(_)))
    }

    /// Node ids of every shade the controller knows.
    pub async fn enumerate(&self) -> Result<Vec<NodeId>, Error> {
        let result = self
            .call(Method::Ping, vec![json!({ "targetID": "*" })])
            .await?;
        node_ids(result)
    }

    pub async fn info(&self, node: &NodeId) -> Result<ShadeInfo, Error> {
        let result = self.call(Method::Info, vec![target(node)]).await?;
        shade_info(node, result)
    }

    pub async fn position(&self, node: &NodeId) -> Result<Position, Error> {
        let result = self.call(Method::Position, vec![target(node)]).await?;
        match result {
            RpcResult::Integer(p) => Position::new(p).map_err(|_| Error::UnexpectedResult {
                method: Method::Position.to_string(),
                expected: "position 0-100",
                got: Value::from(p),
            }),
            other => Err(unexpected(Method::Position, "integer position", &other)),
        }
    }

    pub async fn move_to(&self, node: &NodeId, position: Position) -> Result<(), Error> {
        let result = self
            .connection()
            .call_sequenced(Method::MoveTo, |seq| {
                vec![
                    target(node),
                    json!({ "position": position.percent() }),
                    json!({ "type": "percent" }),
                    json!({ "seq": seq }),
                ]
            })
            .await?;
        expect_ack(Method::MoveTo, node, result)
    }

    pub async fn move_up(&self, node: &NodeId) -> Result<(), Error> {
        self.simple_move(Method::MoveUp, node).await
    }

    pub async fn move_down(&self, node: &NodeId) -> Result<(), Error> {
        self.simple_move(Method::MoveDown, node).await
    }

    pub async fn move_stop(&self, node: &NodeId) -> Result<(), Error> {
        self.simple_move(Method::MoveStop, node).await
    }

    /// Every shade with its info and position. The per-shade requests are
    /// issued together and multiplexed; shades that fail are skipped.
    pub async fn shades(&self) -> Result<Vec<ShadeStatus>, Error> {
        let nodes = self.enumerate().await?;
        let lookups = nodes.iter().map(|node| async move {
            let (info, position) = tokio::join!(self.info(node), self.position(node));
            match (info, position) {
                (Ok(info), Ok(position)) => Some(ShadeStatus { info, position }),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(node = %node, error = %e, "skipping shade");
                    None
                }
            }
        });
        Ok(join_all(lookups).await.into_iter().flatten().collect())
    }

    async fn simple_move(&self, method: Method, node: &NodeId) -> Result<(), Error> {
        let result = self
            .connection()
            .call_sequenced(method, |seq| vec![target(node), json!({ "seq": seq })])
            .await?;
        expect_ack(method, node, result)
    }
}

fn node_ids(result: RpcResult) -> Result<Vec<NodeId>, Error> {
    match result {
        RpcResult::NodeList(ids) => Ok(ids
            .into_iter()
            .filter_map(|raw| match raw.parse::<NodeId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(node = %raw, "ignoring malformed node id");
                    None
                }
            })
            .collect()),
        other => Err(unexpected(Method::Ping, "list of node ids", &other)),
    }
}

fn shade_info(node: &NodeId, result: RpcResult) -> Result<ShadeInfo, Error> {
    match result {
        RpcResult::Info { name, kind } => Ok(ShadeInfo {
            node_id: node.clone(),
            name: name.unwrap_or_else(|| format!("Shade {node}")),
            kind: kind.unwrap_or_else(|| "Unknown".to_owned()),
        }),
        other => Err(unexpected(Method::Info, "object with name and type", &other)),
    }
}

fn expect_ack(method: Method, node: &NodeId, result: RpcResult) -> Result<(), Error> {
    match result {
        RpcResult::Flag(true) => Ok(()),
        other => Err(Error::CommandRejected {
            method: method.to_string(),
            node_id: node.to_string(),
            result: other.to_value(),
        }),
    }
}

fn unexpected(method: Method, expected: &'static str, got: &RpcResult) -> Error {
    Error::UnexpectedResult {
        method: method.to_string(),
        expected,
        got: got.to_value(),
    }
}
