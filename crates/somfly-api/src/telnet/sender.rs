// Outbound queue writer
//
// The only task that writes to the socket once the session is up. Requests
// go out strictly in enqueue order with a fixed pause after each one.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::correlator::Correlator;
use super::rpc::Method;
use crate::error::Error;

/// One serialized request waiting for the writer.
#[derive(Debug)]
pub(crate) struct Outbound {
    pub id: u64,
    pub method: Method,
    pub line: String,
}

pub(crate) type OutboundTx = mpsc::UnboundedSender<Outbound>;
pub(crate) type OutboundRx = mpsc::UnboundedReceiver<Outbound>;

pub(crate) async fn run<W>(
    mut writer: W,
    mut queue: OutboundRx,
    correlator: Arc<Correlator>,
    pacing: Duration,
    cancel: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let msg = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            msg = queue.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        let written = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                correlator.fail(msg.id, Error::ConnectionLost);
                break;
            }
            result = write_line(&mut writer, &msg.line) => result,
        };

        match written {
            Ok(()) => trace!(id = msg.id, method = %msg.method, "request written"),
            Err(e) => {
                warn!(id = msg.id, method = %msg.method, error = %e, "request write failed");
                correlator.fail(
                    msg.id,
                    Error::Send {
                        method: msg.method.to_string(),
                        source: e,
                    },
                );
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(pacing) => {}
        }
    }

    queue.close();
    let mut dropped = 0_usize;
    while let Ok(msg) = queue.try_recv() {
        correlator.fail(msg.id, Error::ConnectionLost);
        dropped += 1;
    }
    let _ = writer.shutdown().await;
    debug!(dropped, "sender loop exiting");
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}
