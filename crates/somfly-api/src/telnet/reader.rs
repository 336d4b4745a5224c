// Inbound frame dispatcher
//
// Reads frames for the lifetime of one session and routes each to the
// correlator or the notification channel. Bad frames are dropped; only a
// read error or EOF ends the loop.

use std::sync::Arc;

use bytes::BytesMut;
use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::{broadcast, watch};
use tokio_util::codec::{Decoder, FramedRead};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connection::ConnectionState;
use super::correlator::Correlator;
use super::framer::FrameDecoder;
use super::rpc::{self, Incoming, Notification};

/// Handles shared between the reader task and its connection.
pub(crate) struct ReaderContext {
    pub correlator: Arc<Correlator>,
    pub state: Arc<watch::Sender<ConnectionState>>,
    pub notifications: broadcast::Sender<Notification>,
}

pub(crate) async fn run<R>(
    reader: R,
    mut leftover: BytesMut,
    ctx: ReaderContext,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    // Frames that arrived together with the ready marker.
    let mut decoder = FrameDecoder::new();
    while let Ok(Some(frame)) = decoder.decode(&mut leftover) {
        dispatch(&frame, &ctx);
    }
    let mut frames = FramedRead::new(reader, decoder);
    frames.read_buffer_mut().extend_from_slice(&leftover);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("reader loop cancelled");
                return;
            }
            frame = frames.next() => match frame {
                Some(Ok(frame)) => dispatch(&frame, &ctx),
                Some(Err(e)) => {
                    warn!(error = %e, "telnet read failed");
                    break;
                }
                None => {
                    info!("controller closed the telnet session");
                    break;
                }
            },
        }
    }

    ctx.state.send_replace(ConnectionState::Disconnected);
    // Stops the sender, which fails anything still queued.
    cancel.cancel();
    let failed = ctx.correlator.fail_all();
    warn!(failed, "connection lost, pending requests failed");
}

/// Route one candidate frame.
pub(crate) fn dispatch(frame: &str, ctx: &ReaderContext) {
    match rpc::parse_frame(frame) {
        Ok(Incoming::Response { id, outcome }) => {
            if !ctx.correlator.resolve(id, outcome) {
                debug!(id, "no pending request for response, dropping");
            }
        }
        Ok(Incoming::Notification(notification)) => {
            debug!(method = %notification.method, "unsolicited notification");
            // No subscribers is fine.
            let _ = ctx.notifications.send(notification);
        }
        Ok(Incoming::Unaddressed) => debug!(frame, "frame without id or method, dropping"),
        Err(e) => warn!(error = %e, frame, "unparseable frame, dropping"),
    }
}
