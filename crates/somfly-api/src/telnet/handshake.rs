// Telnet login dialogue
//
// The UAI+ greets with `User:`, then `Password:`, then `Connected:` once the
// session is ready for JSON-RPC. Prompts may arrive split across any number
// of reads, so markers are searched in the accumulated buffer.

use std::time::Duration;

use bytes::BytesMut;
use secrecy::ExposeSecret;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::auth::Credentials;
use crate::error::Error;

pub const USER_PROMPT: &str = "User:";
pub const PASSWORD_PROMPT: &str = "Password:";
pub const READY_MARKER: &str = "Connected:";

const READ_CHUNK: usize = 1024;

/// Drive the login sequence on a freshly opened stream.
///
/// Each read is bounded by `read_timeout`. Returns whatever bytes followed
/// the ready marker; they belong to the JSON-RPC stream and must seed the
/// frame decoder.
pub async fn perform_handshake<S>(
    stream: &mut S,
    credentials: &Credentials,
    read_timeout: Duration,
) -> Result<BytesMut, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    read_until(stream, &mut buf, USER_PROMPT, read_timeout).await?;
    send_line(stream, &credentials.username, PASSWORD_PROMPT).await?;

    read_until(stream, &mut buf, PASSWORD_PROMPT, read_timeout).await?;
    send_line(stream, credentials.password.expose_secret(), READY_MARKER).await?;

    read_until(stream, &mut buf, READY_MARKER, read_timeout).await?;
    debug!(username = %credentials.username, "telnet login accepted");

    Ok(buf)
}

/// Read until `marker` appears, then drop everything up to and including it.
async fn read_until<S>(
    stream: &mut S,
    buf: &mut BytesMut,
    marker: &'static str,
    read_timeout: Duration,
) -> Result<(), Error>
where
    S: AsyncRead + Unpin,
{
    loop {
        if let Some(pos) = find(buf, marker.as_bytes()) {
            let _ = buf.split_to(pos + marker.len());
            trace!(marker, "handshake prompt received");
            return Ok(());
        }

        buf.reserve(READ_CHUNK);
        let read = tokio::time::timeout(read_timeout, stream.read_buf(buf))
            .await
            .map_err(|_| Error::Handshake {
                expected: marker,
                reason: format!("no data within {}ms", read_timeout.as_millis()),
            })?
            .map_err(|e| Error::Handshake {
                expected: marker,
                reason: e.to_string(),
            })?;

        if read == 0 {
            return Err(Error::Handshake {
                expected: marker,
                reason: "connection closed by controller".into(),
            });
        }
    }
}

/// Write `value` followed by CRLF. `next` names the prompt the write is
/// answering toward, for error context.
async fn send_line<S>(stream: &mut S, value: &str, next: &'static str) -> Result<(), Error>
where
    S: AsyncWrite + Unpin,
{
    let line = format!("{value}\r\n");
    let write = async {
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await
    };
    write.await.map_err(|e| Error::Handshake {
        expected: next,
        reason: format!("write failed: {e}"),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
